//! Pointer/keyboard routing and the exclusive capture slot.
//!
//! Dispatch descends the draw lists topmost-first, so the element drawn in
//! front wins hit priority. While capture is held, events go to the holder
//! directly (optionally re-distributed into its subtree); unhandled events
//! are re-offered up the parent chain where propagation is enabled.

use crate::element::{ChildList, ElementId};
use crate::error::{Error, Result};
use crate::events::ElementEvent;
use crate::geometry::Vec2;
use crate::input::events::{CursorButton, CursorEvent, KeyEvent, Modifiers};
use crate::input::repeat::RepeatState;
use crate::UiContext;

#[derive(Clone, Copy)]
enum CursorPhase {
    Press,
    Release,
    Move,
}

impl UiContext {
    // ------------------------------------------------------------------
    // Capture
    // ------------------------------------------------------------------

    /// The element currently holding exclusive pointer capture, if any.
    pub fn capture_holder(&mut self) -> Option<ElementId> {
        if let Some(c) = self.capture {
            if self.elements.contains_key(c) {
                return Some(c);
            }
            self.capture = None;
        }
        None
    }

    /// Acquires exclusive pointer capture for `id`.
    ///
    /// Fails with `InvalidRequest` if the element cannot receive input
    /// (disabled or effectively invisible). Stealing capture fires
    /// `CaptureLost` on the previous holder unless that holder is in
    /// restore-old-capture mode, in which case the whole steal is silent and
    /// the saved holder is restored when capture is next released.
    ///
    /// Restore bookkeeping is single-level: the saved slot holds one
    /// element; a second restore-mode acquisition overwrites it.
    pub fn capture(&mut self, id: ElementId) -> Result<()> {
        self.checked(id)?;
        if !self.elements[id].input.enabled || !self.is_effectively_visible(id) {
            return Err(Error::InvalidRequest(format!(
                "'{}' cannot receive input",
                self.elements[id].name
            )));
        }
        if self.capture_holder() == Some(id) {
            return Ok(());
        }
        let silent = match self.capture_holder() {
            Some(prev) => {
                if self.elements[id].input.restore_old_capture {
                    if let Some(evicted) = self.old_capture.replace(prev) {
                        log::debug!(
                            "capture restore slot overwritten; '{}' will not be restored",
                            self.elements
                                .get(evicted)
                                .map(|e| e.name())
                                .unwrap_or("<destroyed>")
                        );
                    }
                }
                if self.elements[prev].input.restore_old_capture {
                    true
                } else {
                    self.emit(ElementEvent::CaptureLost { element: prev });
                    false
                }
            }
            None => false,
        };
        self.capture = Some(id);
        if !silent {
            self.emit(ElementEvent::CaptureGained { element: id });
        }
        if matches!(&self.repeat, Some(r) if r.element != id) {
            self.repeat = None;
        }
        Ok(())
    }

    /// Releases capture. If a saved previous holder exists it is restored
    /// silently (no lost/gained events); otherwise `CaptureLost` fires on
    /// the releasing element. Any in-progress drag or auto-repeat tied to
    /// the holder ends synchronously.
    pub fn release_capture(&mut self) {
        let Some(cur) = self.capture.take() else {
            return;
        };
        if matches!(&self.repeat, Some(r) if r.element == cur) {
            self.repeat = None;
        }
        if self.drag.as_ref().is_some_and(|d| d.item == cur) {
            self.cancel_drag();
        }
        match self.old_capture.take() {
            Some(old) if self.elements.contains_key(old) => {
                self.capture = Some(old);
            }
            Some(_) => {
                log::warn!("saved capture holder was destroyed; nothing to restore");
                self.emit(ElementEvent::CaptureLost { element: cur });
            }
            None => {
                self.emit(ElementEvent::CaptureLost { element: cur });
            }
        }
    }

    // ------------------------------------------------------------------
    // Keyboard focus
    // ------------------------------------------------------------------

    pub fn focused(&self) -> Option<ElementId> {
        self.focus
    }

    pub fn set_focus(&mut self, id: ElementId) -> Result<()> {
        self.checked(id)?;
        if !self.elements[id].input.enabled || !self.is_effectively_visible(id) {
            return Err(Error::InvalidRequest(format!(
                "'{}' cannot receive input",
                self.elements[id].name
            )));
        }
        self.focus = Some(id);
        Ok(())
    }

    pub fn clear_focus(&mut self) {
        self.focus = None;
    }

    // ------------------------------------------------------------------
    // Modal routing
    // ------------------------------------------------------------------

    /// The current modal target, if any and still alive.
    pub fn modal_target(&self) -> Option<ElementId> {
        self.modal.filter(|&m| self.elements.contains_key(m))
    }

    /// Makes `id` the modal target. While one is set, cursor and key events
    /// that would land outside its subtree are redirected to it. Capture
    /// takes precedence over the modal slot.
    pub fn set_modal(&mut self, id: ElementId) -> Result<()> {
        self.checked(id)?;
        if !self.elements[id].input.enabled || !self.is_effectively_visible(id) {
            return Err(Error::InvalidRequest(format!(
                "'{}' cannot receive input",
                self.elements[id].name
            )));
        }
        self.modal = Some(id);
        Ok(())
    }

    pub fn clear_modal(&mut self) {
        self.modal = None;
    }

    /// Redirects a nominal target into the modal subtree: targets outside
    /// it (including a missed hit) collapse onto the modal element itself.
    fn constrain_to_modal(&self, target: Option<ElementId>) -> Option<ElementId> {
        let Some(m) = self.modal_target() else {
            return target;
        };
        match target {
            Some(t) if t == m || self.is_ancestor(m, t) => Some(t),
            _ => Some(m),
        }
    }

    // ------------------------------------------------------------------
    // Hit testing
    // ------------------------------------------------------------------

    /// Topmost eligible element at a screen point, or `None`.
    pub fn hit_test(&mut self, pos: Vec2) -> Option<ElementId> {
        self.hit_test_filtered(pos, false, None)
    }

    /// Hit test optionally including disabled elements.
    pub fn hit_test_with(&mut self, pos: Vec2, allow_disabled: bool) -> Option<ElementId> {
        self.hit_test_filtered(pos, allow_disabled, None)
    }

    pub(crate) fn hit_test_filtered(
        &mut self,
        pos: Vec2,
        allow_disabled: bool,
        exclude: Option<ElementId>,
    ) -> Option<ElementId> {
        let roots = self.roots.clone();
        self.hit_descend(&roots, pos, allow_disabled, exclude)
    }

    /// Topmost-first descent: at each level pick the last-drawn child
    /// containing the point, then recurse into it.
    fn hit_descend(
        &mut self,
        candidates: &[ElementId],
        pos: Vec2,
        allow_disabled: bool,
        exclude: Option<ElementId>,
    ) -> Option<ElementId> {
        for &id in candidates.iter().rev() {
            if Some(id) == exclude {
                continue;
            }
            let Some(el) = self.elements.get(id) else {
                continue;
            };
            if !el.render.visible || el.input.cursor_pass_through {
                continue;
            }
            if !allow_disabled && !el.input.enabled {
                continue;
            }
            if !self.is_hit(id, pos) {
                continue;
            }
            let kids: ChildList = self.elements[id].draw_list.clone();
            let deeper = self.hit_descend(&kids, pos, allow_disabled, exclude);
            return Some(deeper.unwrap_or(id));
        }
        None
    }

    /// Point-in-element test against the cached hit rect, or the widget
    /// layer's override when one is installed (it receives the local point
    /// and fully replaces the default test).
    pub fn is_hit(&mut self, id: ElementId, pos: Vec2) -> bool {
        if !self.elements.contains_key(id) {
            return false;
        }
        match self.handlers.get(id).and_then(|h| h.is_hit.clone()) {
            Some(f) => f(self.to_local(id, pos)),
            None => self.hit_rect(id).contains(pos),
        }
    }

    // ------------------------------------------------------------------
    // Event injection
    // ------------------------------------------------------------------

    /// Routes a cursor move. Returns whether some element handled it.
    pub fn inject_cursor_move(&mut self, pos: Vec2, modifiers: Modifiers) -> bool {
        self.cursor_pos = pos;
        self.modifiers = modifiers;
        self.refresh_hover();
        self.update_drag_target();
        let Some(target) = self.cursor_target(pos) else {
            return false;
        };
        let local = self.to_local(target, pos);
        self.emit(ElementEvent::CursorMoved {
            element: target,
            position: local,
        });
        self.deliver_cursor(target, None, false, CursorPhase::Move)
    }

    /// Routes a button press at the current cursor position.
    pub fn inject_cursor_press(&mut self, button: CursorButton, modifiers: Modifiers) -> bool {
        self.modifiers = modifiers;
        let pos = self.cursor_pos;
        let Some(target) = self.cursor_target(pos) else {
            return false;
        };
        if self.elements[target].render.rise_on_click {
            self.rise_chain(target);
        }
        if self.elements[target].input.auto_repeat {
            self.repeat = Some(RepeatState::new(target, button));
        }
        self.emit(ElementEvent::CursorPressed {
            element: target,
            button,
            repeated: false,
        });
        self.deliver_cursor(target, Some(button), false, CursorPhase::Press)
    }

    /// Routes a button release; ends auto-repeat and completes an active
    /// drag (the drop fires on the element under the cursor).
    pub fn inject_cursor_release(&mut self, button: CursorButton, modifiers: Modifiers) -> bool {
        self.modifiers = modifiers;
        if matches!(&self.repeat, Some(r) if r.button == button) {
            self.repeat = None;
        }
        let pos = self.cursor_pos;
        let handled = match self.cursor_target(pos) {
            Some(target) => {
                self.emit(ElementEvent::CursorReleased {
                    element: target,
                    button,
                });
                self.deliver_cursor(target, Some(button), false, CursorPhase::Release)
            }
            None => false,
        };
        if self.drag.is_some() {
            self.end_drag();
        }
        handled
    }

    /// Routes a key event to the capture holder, falling back to the
    /// focused element (subject to modal redirection), with parent
    /// propagation.
    pub fn inject_key(&mut self, ev: KeyEvent) -> bool {
        let target = self
            .capture_holder()
            .or_else(|| self.constrain_to_modal(self.focus));
        let Some(target) = target else {
            return false;
        };
        let mut cur = Some(target);
        while let Some(id) = cur {
            if !self.elements.contains_key(id) {
                break;
            }
            if let Some(f) = self.handlers.get(id).and_then(|h| h.on_key.clone()) {
                if f(&ev) {
                    return true;
                }
            }
            if !self.elements[id].input.propagate_to_parent {
                break;
            }
            cur = self.elements[id].parent;
        }
        false
    }

    /// Advances cooperative timers by `dt` seconds: auto-repeat presses and
    /// the drag target re-evaluation (the tree may have mutated under a
    /// stationary cursor).
    pub fn update(&mut self, dt: f32) {
        if let Some(mut r) = self.repeat.take() {
            let eligible = self.elements.contains_key(r.element)
                && self.elements[r.element].input.enabled
                && !matches!(self.capture, Some(c) if c != r.element);
            if eligible {
                let (delay, rate) = {
                    let cfg = &self.elements[r.element].input;
                    (cfg.repeat_delay, cfg.repeat_rate)
                };
                let due = r.advance(dt, delay, rate);
                let (element, button) = (r.element, r.button);
                self.repeat = Some(r);
                for _ in 0..due {
                    self.emit(ElementEvent::CursorPressed {
                        element,
                        button,
                        repeated: true,
                    });
                    self.deliver_cursor(element, Some(button), true, CursorPhase::Press);
                }
            }
        }
        self.update_drag_target();
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Nominal target for a cursor event: the capture holder when capture is
    /// held (optionally re-descending into its subtree), else the ordinary
    /// hit test. A dragged payload never targets itself through hit tests.
    pub(crate) fn cursor_target(&mut self, pos: Vec2) -> Option<ElementId> {
        if let Some(cap) = self.capture_holder() {
            if self.elements[cap].input.distributes_captured {
                let kids: ChildList = self.elements[cap].draw_list.clone();
                if let Some(t) = self.hit_descend(&kids, pos, false, None) {
                    return Some(t);
                }
            }
            return Some(cap);
        }
        let exclude = self.drag.as_ref().map(|d| d.item);
        let hit = self.hit_test_filtered(pos, false, exclude);
        self.constrain_to_modal(hit)
    }

    fn deliver_cursor(
        &mut self,
        target: ElementId,
        button: Option<CursorButton>,
        repeated: bool,
        phase: CursorPhase,
    ) -> bool {
        let pos = self.cursor_pos;
        let modifiers = self.modifiers;
        let mut cur = Some(target);
        while let Some(id) = cur {
            if !self.elements.contains_key(id) {
                break;
            }
            let ev = CursorEvent {
                position: pos,
                local: self.to_local(id, pos),
                button,
                modifiers,
                repeated,
            };
            let handler = self.handlers.get(id).and_then(|h| match phase {
                CursorPhase::Press => h.on_cursor_press.clone(),
                CursorPhase::Release => h.on_cursor_release.clone(),
                CursorPhase::Move => h.on_cursor_move.clone(),
            });
            if let Some(f) = handler {
                if f(&ev) {
                    return true;
                }
            }
            if !self.elements[id].input.propagate_to_parent {
                break;
            }
            cur = self.elements[id].parent;
        }
        false
    }

    /// Recomputes the hover chain and fires enter/leave edges. The chain is
    /// the ancestor path of the nominal (non-captured) hit target, so
    /// containers get enter/leave alongside the leaf.
    fn refresh_hover(&mut self) {
        let exclude = self.drag.as_ref().map(|d| d.item);
        let hit = self.hit_test_filtered(self.cursor_pos, false, exclude);
        let leaf = self.constrain_to_modal(hit);
        let mut path = ChildList::new();
        let mut cur = leaf;
        while let Some(id) = cur {
            path.insert(0, id);
            cur = self.elements[id].parent;
        }
        let old = std::mem::take(&mut self.hover);
        for &id in old.iter().rev() {
            if !path.contains(&id) && self.elements.contains_key(id) {
                self.emit(ElementEvent::CursorLeft { element: id });
            }
        }
        for &id in path.iter() {
            if !old.contains(&id) {
                self.emit(ElementEvent::CursorEntered { element: id });
            }
        }
        self.hover = path;
    }
}
