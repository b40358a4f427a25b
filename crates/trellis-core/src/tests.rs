#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::*;

    fn ctx() -> UiContext {
        let _ = env_logger::builder().is_test(true).try_init();
        UiContext::new(Size::new(800.0, 600.0))
    }

    fn fullscreen_root(ui: &mut UiContext) -> ElementId {
        let r = ui.create_element("root").unwrap();
        ui.add_root(r).unwrap();
        ui.set_area(r, UnitPoint::ZERO, UnitSize::rel(1.0, 1.0))
            .unwrap();
        r
    }

    fn child_px(
        ui: &mut UiContext,
        parent: ElementId,
        name: &str,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    ) -> ElementId {
        let c = ui.create_element(name).unwrap();
        ui.attach(parent, c).unwrap();
        ui.set_area(c, UnitPoint::px(x, y), UnitSize::px(w, h))
            .unwrap();
        c
    }

    fn count(events: &[ElementEvent], pred: impl Fn(&ElementEvent) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    // ------------------------------------------------------------------
    // Tree & lifecycle
    // ------------------------------------------------------------------

    #[test]
    fn duplicate_names_are_rejected() {
        let mut ui = ctx();
        ui.create_element("a").unwrap();
        assert!(matches!(
            ui.create_element("a"),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn attach_rejects_cycles_and_double_attach() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let a = child_px(&mut ui, root, "a", 0.0, 0.0, 100.0, 100.0);
        let b = child_px(&mut ui, a, "b", 0.0, 0.0, 50.0, 50.0);

        assert!(matches!(
            ui.attach(a, a),
            Err(Error::InvalidHierarchy(_))
        ));
        // b is already under a.
        assert!(matches!(
            ui.attach(root, b),
            Err(Error::InvalidHierarchy(_))
        ));
        // Attaching an ancestor under its descendant would form a cycle.
        ui.detach(a).unwrap();
        assert!(matches!(
            ui.attach(b, a),
            Err(Error::InvalidHierarchy(_))
        ));
    }

    #[test]
    fn handles_to_destroyed_elements_fail_lookup() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let a = child_px(&mut ui, root, "a", 0.0, 0.0, 100.0, 100.0);
        ui.destroy(a).unwrap();
        assert!(!ui.is_alive(a));
        assert!(ui.element(a).is_none());
        assert!(matches!(ui.set_visible(a, false), Err(Error::UnknownObject(_))));
        // The name is free again.
        assert!(ui.create_element("a").is_ok());
    }

    #[test]
    fn destroy_honors_destroyed_by_parent() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let panel = child_px(&mut ui, root, "panel", 0.0, 0.0, 400.0, 400.0);
        let doomed = child_px(&mut ui, panel, "doomed", 0.0, 0.0, 10.0, 10.0);
        let survivor = child_px(&mut ui, panel, "survivor", 20.0, 0.0, 10.0, 10.0);
        ui.set_destroyed_by_parent(survivor, false).unwrap();

        ui.destroy(panel).unwrap();
        assert!(!ui.is_alive(doomed));
        assert!(ui.is_alive(survivor));
        assert_eq!(ui.element(survivor).unwrap().parent(), None);
        assert!(!ui.roots().contains(&survivor));
    }

    // ------------------------------------------------------------------
    // Layout resolution
    // ------------------------------------------------------------------

    #[test]
    fn relative_child_follows_viewport_resize() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let half = ui.create_element("half").unwrap();
        ui.attach(root, half).unwrap();
        ui.set_area(half, UnitPoint::ZERO, UnitSize::rel(0.5, 0.5))
            .unwrap();
        assert_eq!(
            ui.element(half).unwrap().pixel_rect(),
            Rect::new(0.0, 0.0, 400.0, 300.0)
        );
        ui.drain_events();

        ui.set_viewport(Size::new(1000.0, 800.0));
        assert_eq!(
            ui.element(half).unwrap().pixel_rect(),
            Rect::new(0.0, 0.0, 500.0, 400.0)
        );
        let events = ui.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, ElementEvent::Sized { element } if *element == half)),
            1
        );
    }

    #[test]
    fn mixed_units_resolve_against_parent_inner_area() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        ui.set_insets(root, Insets::uniform(10.0)).unwrap();
        let c = ui.create_element("c").unwrap();
        ui.attach(root, c).unwrap();
        // x = 0.25 * 780 + 5
        ui.set_area(
            c,
            UnitPoint::new(UnitValue::new(0.25, 5.0), UnitValue::px(0.0)),
            UnitSize::rel(0.5, 1.0),
        )
        .unwrap();
        let r = ui.element(c).unwrap().pixel_rect();
        assert_eq!(r, Rect::new(10.0 + 195.0 + 5.0, 10.0, 390.0, 580.0));
    }

    #[test]
    fn noop_area_set_fires_nothing_and_keeps_clips_valid() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let a = child_px(&mut ui, root, "a", 10.0, 10.0, 100.0, 100.0);
        // Populate caches, then settle the queue.
        ui.outer_clip(a);
        ui.inner_clip(a);
        ui.hit_rect(a);
        ui.drain_events();
        assert!(ui.clip_caches_valid(a));

        ui.set_area(a, UnitPoint::px(10.0, 10.0), UnitSize::px(100.0, 100.0))
            .unwrap();
        assert!(ui.drain_events().is_empty());
        assert!(ui.clip_caches_valid(a));
    }

    #[test]
    fn min_max_and_aspect_apply_to_resolved_size() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let a = child_px(&mut ui, root, "a", 0.0, 0.0, 300.0, 100.0);
        ui.set_aspect(a, AspectMode::Shrink, 2.0).unwrap();
        // 300x100 violates 2:1; width shrinks to 200.
        assert_eq!(ui.element(a).unwrap().pixel_rect().size(), Size::new(200.0, 100.0));

        ui.set_min_size(a, UnitSize::px(250.0, 0.0)).unwrap();
        assert_eq!(ui.element(a).unwrap().pixel_rect().size().width, 250.0);
    }

    // ------------------------------------------------------------------
    // Clipping
    // ------------------------------------------------------------------

    #[test]
    fn child_clip_is_contained_in_parent_inner_clip() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let panel = child_px(&mut ui, root, "panel", 100.0, 100.0, 200.0, 200.0);
        ui.set_insets(panel, Insets::uniform(5.0)).unwrap();
        // Deliberately overflows the panel on the right/bottom.
        let inner = child_px(&mut ui, panel, "inner", 150.0, 150.0, 300.0, 300.0);

        let parent_inner = ui.inner_clip(panel);
        let child_outer = ui.outer_clip(inner);
        assert!(parent_inner.contains_rect(&child_outer));
        assert!(ui.hit_rect(panel).contains_rect(&ui.hit_rect(inner)));
    }

    #[test]
    fn unclipped_child_is_bounded_by_viewport_only() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let panel = child_px(&mut ui, root, "panel", 100.0, 100.0, 100.0, 100.0);
        let tip = child_px(&mut ui, panel, "tip", 150.0, 150.0, 300.0, 50.0);
        ui.set_clipped_by_parent(tip, false).unwrap();
        let clip = ui.outer_clip(tip);
        assert_eq!(clip, Rect::new(250.0, 250.0, 300.0, 50.0));
    }

    #[test]
    fn moving_an_ancestor_invalidates_descendant_clips() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let panel = child_px(&mut ui, root, "panel", 0.0, 0.0, 200.0, 200.0);
        let inner = child_px(&mut ui, panel, "inner", 10.0, 10.0, 50.0, 50.0);
        assert_eq!(ui.outer_clip(inner), Rect::new(10.0, 10.0, 50.0, 50.0));

        ui.set_position(panel, UnitPoint::px(100.0, 0.0)).unwrap();
        // The getter revalidates; no stale rect is observable.
        assert_eq!(ui.outer_clip(inner), Rect::new(110.0, 10.0, 50.0, 50.0));
    }

    // ------------------------------------------------------------------
    // Z-order
    // ------------------------------------------------------------------

    #[test]
    fn later_siblings_draw_in_front_and_move_to_front_raises() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let a = child_px(&mut ui, root, "a", 0.0, 0.0, 100.0, 100.0);
        let b = child_px(&mut ui, root, "b", 0.0, 0.0, 100.0, 100.0);
        assert!(ui.z_index(b) > ui.z_index(a));
        assert_eq!(ui.hit_test(Vec2::new(50.0, 50.0)), Some(b));

        ui.move_to_front(a);
        assert!(ui.z_index(a) > ui.z_index(b));
        assert_eq!(ui.hit_test(Vec2::new(50.0, 50.0)), Some(a));
    }

    #[test]
    fn on_top_band_stays_above_normal_band() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let normal = child_px(&mut ui, root, "normal", 0.0, 0.0, 100.0, 100.0);
        let pinned = child_px(&mut ui, root, "pinned", 0.0, 0.0, 100.0, 100.0);
        ui.set_always_on_top(pinned, true).unwrap();
        let late = child_px(&mut ui, root, "late", 0.0, 0.0, 100.0, 100.0);

        // A new normal child lands at the top of the normal band, still
        // behind the pinned one.
        let dl = ui.element(root).unwrap().draw_list().to_vec();
        assert_eq!(dl, vec![normal, late, pinned]);

        ui.move_to_front(normal);
        let dl = ui.element(root).unwrap().draw_list().to_vec();
        assert_eq!(dl, vec![late, normal, pinned]);

        // Back of the on-top band is still in front of every normal child.
        ui.move_to_back(pinned);
        let dl = ui.element(root).unwrap().draw_list().to_vec();
        assert_eq!(dl, vec![late, normal, pinned]);
    }

    #[test]
    fn cross_band_relative_move_is_a_silent_noop() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let a = child_px(&mut ui, root, "a", 0.0, 0.0, 100.0, 100.0);
        let b = child_px(&mut ui, root, "b", 0.0, 0.0, 100.0, 100.0);
        ui.set_always_on_top(b, true).unwrap();
        ui.drain_events();

        let before = ui.element(root).unwrap().draw_list().to_vec();
        ui.move_in_front(a, b);
        assert_eq!(ui.element(root).unwrap().draw_list().to_vec(), before);
        assert_eq!(
            count(&ui.drain_events(), |e| matches!(e, ElementEvent::ZOrderChanged { .. })),
            0
        );
    }

    #[test]
    fn z_order_disabled_ignores_move_requests() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let a = child_px(&mut ui, root, "a", 0.0, 0.0, 100.0, 100.0);
        let b = child_px(&mut ui, root, "b", 0.0, 0.0, 100.0, 100.0);
        ui.set_render_config(a, |r| r.z_order_enabled = false)
            .unwrap();
        ui.move_to_front(a);
        assert_eq!(ui.element(root).unwrap().draw_list().to_vec(), vec![a, b]);
    }

    // ------------------------------------------------------------------
    // Hit testing & cursor dispatch
    // ------------------------------------------------------------------

    #[test]
    fn hit_test_skips_invisible_disabled_and_pass_through() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let back = child_px(&mut ui, root, "back", 0.0, 0.0, 200.0, 200.0);
        let front = child_px(&mut ui, root, "front", 0.0, 0.0, 200.0, 200.0);
        let p = Vec2::new(50.0, 50.0);
        assert_eq!(ui.hit_test(p), Some(front));

        ui.set_input_config(front, |i| i.cursor_pass_through = true)
            .unwrap();
        assert_eq!(ui.hit_test(p), Some(back));

        ui.set_input_config(front, |i| i.cursor_pass_through = false)
            .unwrap();
        ui.set_visible(front, false).unwrap();
        assert_eq!(ui.hit_test(p), Some(back));

        ui.set_visible(front, true).unwrap();
        ui.set_enabled(front, false).unwrap();
        assert_eq!(ui.hit_test(p), Some(back));
        assert_eq!(ui.hit_test_with(p, true), Some(front));
    }

    #[test]
    fn custom_hit_override_replaces_rect_test() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let disc = child_px(&mut ui, root, "disc", 0.0, 0.0, 100.0, 100.0);
        ui.set_handlers(
            disc,
            InputHandlers::new().is_hit(|local| {
                let d = Vec2::new(local.x - 50.0, local.y - 50.0);
                d.x * d.x + d.y * d.y <= 50.0 * 50.0
            }),
        )
        .unwrap();
        assert_eq!(ui.hit_test(Vec2::new(50.0, 50.0)), Some(disc));
        // Inside the rect, outside the disc.
        assert_eq!(ui.hit_test(Vec2::new(2.0, 2.0)), Some(root));
    }

    #[test]
    fn unhandled_events_propagate_to_parent_and_stop_when_handled() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let panel = child_px(&mut ui, root, "panel", 100.0, 100.0, 200.0, 200.0);
        let button = child_px(&mut ui, panel, "button", 20.0, 20.0, 50.0, 50.0);
        ui.set_input_config(button, |i| i.propagate_to_parent = true)
            .unwrap();
        ui.set_input_config(panel, |i| i.propagate_to_parent = true)
            .unwrap();

        let log: Rc<RefCell<Vec<(&'static str, Vec2)>>> = Rc::default();
        let l = log.clone();
        ui.set_handlers(
            panel,
            InputHandlers::new().on_cursor_press(move |ev| {
                l.borrow_mut().push(("panel", ev.local));
                true
            }),
        )
        .unwrap();
        let l = log.clone();
        ui.set_handlers(
            root,
            InputHandlers::new().on_cursor_press(move |ev| {
                l.borrow_mut().push(("root", ev.local));
                true
            }),
        )
        .unwrap();

        ui.inject_cursor_move(Vec2::new(130.0, 130.0), Modifiers::default());
        assert!(ui.inject_cursor_press(CursorButton::Left, Modifiers::default()));
        // Button has no handler; panel handles and the chain stops there.
        // Locals are per-receiver.
        assert_eq!(&*log.borrow(), &[("panel", Vec2::new(30.0, 30.0))]);
    }

    #[test]
    fn hover_edges_fire_for_the_whole_ancestor_chain() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let panel = child_px(&mut ui, root, "panel", 100.0, 100.0, 200.0, 200.0);
        let button = child_px(&mut ui, panel, "button", 20.0, 20.0, 50.0, 50.0);
        ui.drain_events();

        ui.inject_cursor_move(Vec2::new(130.0, 130.0), Modifiers::default());
        let events = ui.drain_events();
        let entered: Vec<ElementId> = events
            .iter()
            .filter_map(|e| match e {
                ElementEvent::CursorEntered { element } => Some(*element),
                _ => None,
            })
            .collect();
        assert_eq!(entered, vec![root, panel, button]);

        // Move off the button but stay inside the panel.
        ui.inject_cursor_move(Vec2::new(290.0, 290.0), Modifiers::default());
        let events = ui.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, ElementEvent::CursorLeft { element } if *element == button)),
            1
        );
        assert_eq!(count(&events, |e| matches!(e, ElementEvent::CursorLeft { .. })), 1);
        assert_eq!(count(&events, |e| matches!(e, ElementEvent::CursorEntered { .. })), 0);
    }

    #[test]
    fn press_rises_the_clicked_chain() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let a = child_px(&mut ui, root, "a", 0.0, 0.0, 200.0, 200.0);
        let b = child_px(&mut ui, root, "b", 100.0, 0.0, 200.0, 200.0);
        assert!(ui.z_index(b) > ui.z_index(a));

        ui.inject_cursor_move(Vec2::new(50.0, 50.0), Modifiers::default());
        ui.inject_cursor_press(CursorButton::Left, Modifiers::default());
        assert!(ui.z_index(a) > ui.z_index(b));
    }

    // ------------------------------------------------------------------
    // Capture
    // ------------------------------------------------------------------

    #[test]
    fn at_most_one_element_holds_capture() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let a = child_px(&mut ui, root, "a", 0.0, 0.0, 100.0, 100.0);
        let b = child_px(&mut ui, root, "b", 100.0, 0.0, 100.0, 100.0);

        ui.capture(a).unwrap();
        assert_eq!(ui.capture_holder(), Some(a));
        ui.capture(b).unwrap();
        assert_eq!(ui.capture_holder(), Some(b));
        ui.release_capture();
        assert_eq!(ui.capture_holder(), None);
    }

    #[test]
    fn capture_steal_fires_lost_and_gained_exactly_once() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let b = child_px(&mut ui, root, "b", 0.0, 0.0, 100.0, 100.0);
        let c = child_px(&mut ui, root, "c", 100.0, 0.0, 100.0, 100.0);
        ui.capture(b).unwrap();
        ui.drain_events();

        ui.capture(c).unwrap();
        let events = ui.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, ElementEvent::CaptureLost { element } if *element == b)),
            1
        );
        assert_eq!(
            count(&events, |e| matches!(e, ElementEvent::CaptureGained { element } if *element == c)),
            1
        );
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn restore_mode_returns_capture_to_previous_holder_silently() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let p = child_px(&mut ui, root, "p", 0.0, 0.0, 100.0, 100.0);
        let tip = child_px(&mut ui, root, "tip", 100.0, 0.0, 100.0, 100.0);
        ui.set_input_config(tip, |i| i.restore_old_capture = true)
            .unwrap();

        ui.capture(p).unwrap();
        ui.capture(tip).unwrap();
        assert_eq!(ui.capture_holder(), Some(tip));
        ui.drain_events();

        ui.release_capture();
        assert_eq!(ui.capture_holder(), Some(p));
        // The revert is silent: neither lost nor gained.
        let events = ui.drain_events();
        assert_eq!(count(&events, |e| matches!(e, ElementEvent::CaptureLost { .. })), 0);
        assert_eq!(count(&events, |e| matches!(e, ElementEvent::CaptureGained { .. })), 0);
    }

    #[test]
    fn stealing_from_a_restore_mode_holder_is_silent() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let tip = child_px(&mut ui, root, "tip", 0.0, 0.0, 100.0, 100.0);
        let other = child_px(&mut ui, root, "other", 100.0, 0.0, 100.0, 100.0);
        ui.set_input_config(tip, |i| i.restore_old_capture = true)
            .unwrap();
        ui.capture(tip).unwrap();
        ui.drain_events();

        ui.capture(other).unwrap();
        assert!(ui.drain_events().is_empty());
        assert_eq!(ui.capture_holder(), Some(other));
    }

    #[test]
    fn captured_element_receives_events_outside_its_rect() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let knob = child_px(&mut ui, root, "knob", 0.0, 0.0, 50.0, 50.0);
        let hits: Rc<RefCell<Vec<Vec2>>> = Rc::default();
        let h = hits.clone();
        ui.set_handlers(
            knob,
            InputHandlers::new().on_cursor_move(move |ev| {
                h.borrow_mut().push(ev.local);
                true
            }),
        )
        .unwrap();

        ui.capture(knob).unwrap();
        ui.inject_cursor_move(Vec2::new(400.0, 300.0), Modifiers::default());
        assert_eq!(&*hits.borrow(), &[Vec2::new(400.0, 300.0)]);
    }

    #[test]
    fn hiding_or_destroying_the_holder_releases_capture() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let a = child_px(&mut ui, root, "a", 0.0, 0.0, 100.0, 100.0);
        ui.capture(a).unwrap();
        ui.set_visible(a, false).unwrap();
        assert_eq!(ui.capture_holder(), None);

        ui.set_visible(a, true).unwrap();
        // A hidden element cannot take capture.
        ui.set_visible(a, false).unwrap();
        assert!(matches!(ui.capture(a), Err(Error::InvalidRequest(_))));

        ui.set_visible(a, true).unwrap();
        ui.capture(a).unwrap();
        ui.destroy(a).unwrap();
        assert_eq!(ui.capture_holder(), None);
    }

    #[test]
    fn distributes_captured_redirects_into_the_subtree() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let frame = child_px(&mut ui, root, "frame", 0.0, 0.0, 400.0, 400.0);
        let close = child_px(&mut ui, frame, "close", 10.0, 10.0, 20.0, 20.0);
        ui.set_input_config(frame, |i| i.distributes_captured = true)
            .unwrap();
        ui.capture(frame).unwrap();
        ui.drain_events();

        ui.inject_cursor_move(Vec2::new(15.0, 15.0), Modifiers::default());
        let events = ui.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, ElementEvent::CursorMoved { element, .. } if *element == close)),
            1
        );
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    #[test]
    fn keys_go_to_focus_unless_capture_is_held() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let editor = child_px(&mut ui, root, "editor", 0.0, 0.0, 200.0, 100.0);
        let modal = child_px(&mut ui, root, "modal", 200.0, 0.0, 200.0, 100.0);

        let keys: Rc<RefCell<Vec<&'static str>>> = Rc::default();
        let k = keys.clone();
        ui.set_handlers(editor, InputHandlers::new().on_key(move |_| {
            k.borrow_mut().push("editor");
            true
        }))
        .unwrap();
        let k = keys.clone();
        ui.set_handlers(modal, InputHandlers::new().on_key(move |_| {
            k.borrow_mut().push("modal");
            true
        }))
        .unwrap();

        let ev = KeyEvent {
            code: 36,
            ch: Some('\r'),
            modifiers: Modifiers::default(),
            pressed: true,
        };
        ui.set_focus(editor).unwrap();
        assert!(ui.inject_key(ev));
        ui.capture(modal).unwrap();
        assert!(ui.inject_key(ev));
        assert_eq!(&*keys.borrow(), &["editor", "modal"]);
    }

    // ------------------------------------------------------------------
    // Modal routing
    // ------------------------------------------------------------------

    #[test]
    fn modal_redirects_presses_outside_its_subtree() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let toolbar = child_px(&mut ui, root, "toolbar", 0.0, 0.0, 100.0, 100.0);
        let dialog = child_px(&mut ui, root, "dialog", 200.0, 200.0, 200.0, 150.0);
        let ok = child_px(&mut ui, dialog, "ok", 10.0, 10.0, 40.0, 20.0);

        let hits: Rc<RefCell<Vec<ElementId>>> = Rc::default();
        for id in [toolbar, dialog, ok] {
            let h = hits.clone();
            ui.set_handlers(
                id,
                InputHandlers::new().on_cursor_press(move |_| {
                    h.borrow_mut().push(id);
                    true
                }),
            )
            .unwrap();
        }

        ui.set_modal(dialog).unwrap();

        // Outside the dialog: the press collapses onto the dialog itself.
        ui.inject_cursor_move(Vec2::new(50.0, 50.0), Modifiers::default());
        ui.inject_cursor_press(CursorButton::Left, Modifiers::default());
        ui.inject_cursor_release(CursorButton::Left, Modifiers::default());

        // The dialog's own children stay reachable.
        ui.inject_cursor_move(Vec2::new(215.0, 215.0), Modifiers::default());
        ui.inject_cursor_press(CursorButton::Left, Modifiers::default());
        ui.inject_cursor_release(CursorButton::Left, Modifiers::default());

        ui.clear_modal();
        ui.inject_cursor_move(Vec2::new(50.0, 50.0), Modifiers::default());
        ui.inject_cursor_press(CursorButton::Left, Modifiers::default());

        assert_eq!(&*hits.borrow(), &[dialog, ok, toolbar]);
    }

    #[test]
    fn modal_receives_keys_when_nothing_is_focused() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let dialog = child_px(&mut ui, root, "dialog", 200.0, 200.0, 200.0, 150.0);

        let seen = Rc::new(RefCell::new(0));
        let s = seen.clone();
        ui.set_handlers(
            dialog,
            InputHandlers::new().on_key(move |_| {
                *s.borrow_mut() += 1;
                true
            }),
        )
        .unwrap();

        let ev = KeyEvent {
            code: 53,
            ch: None,
            modifiers: Modifiers::default(),
            pressed: true,
        };
        assert!(!ui.inject_key(ev));
        ui.set_modal(dialog).unwrap();
        assert!(ui.inject_key(ev));
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn modal_slot_clears_when_its_target_hides_or_dies() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let dialog = child_px(&mut ui, root, "dialog", 200.0, 200.0, 200.0, 150.0);
        let off = child_px(&mut ui, root, "off", 0.0, 0.0, 50.0, 50.0);
        ui.set_enabled(off, false).unwrap();
        assert!(matches!(ui.set_modal(off), Err(Error::InvalidRequest(_))));

        ui.set_modal(dialog).unwrap();
        assert_eq!(ui.modal_target(), Some(dialog));
        ui.set_visible(dialog, false).unwrap();
        assert_eq!(ui.modal_target(), None);

        ui.set_visible(dialog, true).unwrap();
        ui.set_modal(dialog).unwrap();
        ui.destroy(dialog).unwrap();
        assert_eq!(ui.modal_target(), None);
    }

    // ------------------------------------------------------------------
    // Auto-repeat
    // ------------------------------------------------------------------

    #[test]
    fn held_press_repeats_on_injected_time() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let spin = child_px(&mut ui, root, "spin", 0.0, 0.0, 50.0, 50.0);
        ui.set_input_config(spin, |i| i.auto_repeat = true).unwrap();

        ui.inject_cursor_move(Vec2::new(25.0, 25.0), Modifiers::default());
        ui.inject_cursor_press(CursorButton::Left, Modifiers::default());
        ui.drain_events();

        // Below the delay: nothing.
        ui.update(0.1);
        assert_eq!(count(&ui.drain_events(), |e| matches!(e, ElementEvent::CursorPressed { .. })), 0);

        // Crossing the delay fires the first repeat, flagged as repeated.
        ui.update(0.2);
        let events = ui.drain_events();
        assert_eq!(
            count(&events, |e| matches!(
                e,
                ElementEvent::CursorPressed { element, repeated: true, .. } if *element == spin
            )),
            1
        );

        // Then one per rate interval.
        ui.update(0.06);
        assert_eq!(count(&ui.drain_events(), |e| matches!(e, ElementEvent::CursorPressed { .. })), 1);

        // Release stops the stream.
        ui.inject_cursor_release(CursorButton::Left, Modifiers::default());
        ui.drain_events();
        ui.update(1.0);
        assert_eq!(count(&ui.drain_events(), |e| matches!(e, ElementEvent::CursorPressed { .. })), 0);
    }

    // ------------------------------------------------------------------
    // Drag and drop
    // ------------------------------------------------------------------

    #[test]
    fn drag_fires_enter_once_then_drop_once() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let bin = child_px(&mut ui, root, "bin", 400.0, 0.0, 200.0, 200.0);
        let item = child_px(&mut ui, root, "item", 0.0, 0.0, 50.0, 50.0);
        ui.set_handlers(bin, InputHandlers::new().on_drop(|_| true))
            .unwrap();

        ui.inject_cursor_move(Vec2::new(25.0, 25.0), Modifiers::default());
        ui.start_drag(item).unwrap();
        ui.drain_events();

        // Two moves over the same target: a single enter edge.
        ui.inject_cursor_move(Vec2::new(450.0, 50.0), Modifiers::default());
        ui.inject_cursor_move(Vec2::new(460.0, 60.0), Modifiers::default());
        let events = ui.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, ElementEvent::DragDropItemEnters { target, item: i } if *target == bin && *i == item)),
            1
        );

        ui.inject_cursor_release(CursorButton::Left, Modifiers::default());
        let events = ui.drain_events();
        assert_eq!(
            count(&events, |e| matches!(
                e,
                ElementEvent::DragDropItemDropped { target, item: i, accepted: true } if *target == bin && *i == item
            )),
            1
        );
        assert_eq!(ui.drag_item(), None);
        assert_eq!(ui.capture_holder(), None);
    }

    #[test]
    fn leaving_a_target_fires_the_leave_edge() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        // Only the bin accepts drops; everywhere else falls through to root,
        // which we exclude as a target.
        ui.set_input_config(root, |i| i.drag_drop_target = false)
            .unwrap();
        let bin = child_px(&mut ui, root, "bin", 400.0, 0.0, 200.0, 200.0);
        let item = child_px(&mut ui, root, "item", 0.0, 0.0, 50.0, 50.0);

        ui.inject_cursor_move(Vec2::new(25.0, 25.0), Modifiers::default());
        ui.start_drag(item).unwrap();
        ui.inject_cursor_move(Vec2::new(450.0, 50.0), Modifiers::default());
        ui.drain_events();

        ui.inject_cursor_move(Vec2::new(300.0, 300.0), Modifiers::default());
        let events = ui.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, ElementEvent::DragDropItemLeaves { target, .. } if *target == bin)),
            1
        );
        assert_eq!(ui.drag_target(), None);

        // Dropping over nothing ends the drag without a dropped event.
        ui.inject_cursor_release(CursorButton::Left, Modifiers::default());
        let events = ui.drain_events();
        assert_eq!(count(&events, |e| matches!(e, ElementEvent::DragDropItemDropped { .. })), 0);
        assert_eq!(ui.drag_item(), None);
    }

    #[test]
    fn sticky_drag_survives_a_rejected_drop() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let bin = child_px(&mut ui, root, "bin", 400.0, 0.0, 200.0, 200.0);
        let item = child_px(&mut ui, root, "item", 0.0, 0.0, 50.0, 50.0);
        ui.set_input_config(item, |i| i.sticky_drag = true).unwrap();
        ui.set_handlers(bin, InputHandlers::new().on_drop(|_| false))
            .unwrap();

        ui.inject_cursor_move(Vec2::new(25.0, 25.0), Modifiers::default());
        ui.start_drag(item).unwrap();
        ui.inject_cursor_move(Vec2::new(450.0, 50.0), Modifiers::default());
        ui.drain_events();

        ui.inject_cursor_release(CursorButton::Left, Modifiers::default());
        let events = ui.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, ElementEvent::DragDropItemDropped { accepted: false, .. })),
            1
        );
        // Rejected plus sticky: still dragging.
        assert_eq!(ui.drag_item(), Some(item));
    }

    #[test]
    fn cancelling_a_drag_releases_capture_through_the_state_machine() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let p = child_px(&mut ui, root, "p", 0.0, 0.0, 50.0, 50.0);
        let item = child_px(&mut ui, root, "item", 60.0, 0.0, 50.0, 50.0);
        ui.set_input_config(item, |i| i.restore_old_capture = true)
            .unwrap();

        // A restore-mode payload dragged while someone else holds capture:
        // cancelling must hand capture back, silently.
        ui.capture(p).unwrap();
        ui.start_drag(item).unwrap();
        assert_eq!(ui.capture_holder(), Some(item));
        ui.drain_events();
        ui.cancel_drag();
        assert_eq!(ui.capture_holder(), Some(p));
        let events = ui.drain_events();
        assert_eq!(count(&events, |e| matches!(e, ElementEvent::CaptureLost { .. })), 0);
        assert_eq!(count(&events, |e| matches!(e, ElementEvent::CaptureGained { .. })), 0);

        // With nothing to restore, the payload loses capture audibly.
        ui.release_capture();
        let plain = child_px(&mut ui, root, "plain", 120.0, 0.0, 50.0, 50.0);
        ui.drain_events();
        ui.start_drag(plain).unwrap();
        ui.drain_events();
        ui.cancel_drag();
        assert_eq!(ui.capture_holder(), None);
        let events = ui.drain_events();
        assert_eq!(
            count(&events, |e| matches!(e, ElementEvent::CaptureLost { element } if *element == plain)),
            1
        );
    }

    #[test]
    fn a_second_drag_is_rejected_and_cancel_fires_no_drop() {
        let mut ui = ctx();
        let root = fullscreen_root(&mut ui);
        let a = child_px(&mut ui, root, "a", 0.0, 0.0, 50.0, 50.0);
        let b = child_px(&mut ui, root, "b", 60.0, 0.0, 50.0, 50.0);

        ui.start_drag(a).unwrap();
        assert!(matches!(ui.start_drag(b), Err(Error::InvalidRequest(_))));

        ui.drain_events();
        ui.cancel_drag();
        let events = ui.drain_events();
        assert_eq!(count(&events, |e| matches!(e, ElementEvent::DragDropItemDropped { .. })), 0);
        assert_eq!(ui.drag_item(), None);
    }
}
