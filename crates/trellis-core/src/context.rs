//! The UI context: owner of the element arena, roots, viewport, capture and
//! drag state, and the per-tick event queue.
//!
//! All mutable state lives here rather than in globals so multiple
//! independent contexts can coexist without interference. One context is one
//! logical UI thread: nothing is locked, and nothing here spawns threads.

use std::collections::HashMap;
use std::rc::Rc;

use slotmap::{SecondaryMap, SlotMap};

use crate::element::{ChildList, Element, ElementId};
use crate::error::{Error, Result};
use crate::events::ElementEvent;
use crate::geometry::{Insets, Rect, Size, Vec2};
use crate::input::dragdrop::DragState;
use crate::input::handlers::InputHandlers;
use crate::input::repeat::RepeatState;
use crate::input::Modifiers;
use crate::units::{apply_aspect, clamp_size, AspectMode, UnitPoint, UnitRect, UnitSize};

/// Pixel deltas below this are treated as "no change" by `set_area`.
pub const AREA_EPSILON: f32 = 0.01;

/// Skin hook: maps an element's outer rect to the area available for its
/// children, overriding the default inset-based inner rect.
pub type ChildAreaHook = Rc<dyn Fn(Rect) -> Rect>;

pub struct UiContext {
    pub(crate) elements: SlotMap<ElementId, Element>,
    /// Root elements in draw order (last = topmost), banded like any other
    /// draw list.
    pub(crate) roots: ChildList,
    pub(crate) viewport: Size,
    pub(crate) names: HashMap<String, ElementId>,
    pub(crate) next_stamp: u64,

    // Capture is a single slot per context: input devices are single-focus.
    pub(crate) capture: Option<ElementId>,
    pub(crate) old_capture: Option<ElementId>,
    // Modal routing target: input landing outside its subtree is
    // redirected to it.
    pub(crate) modal: Option<ElementId>,
    pub(crate) focus: Option<ElementId>,

    pub(crate) cursor_pos: Vec2,
    pub(crate) modifiers: Modifiers,
    /// Ancestor chain (root..leaf) currently under the cursor.
    pub(crate) hover: ChildList,
    pub(crate) repeat: Option<RepeatState>,
    pub(crate) drag: Option<DragState>,

    pub(crate) handlers: SecondaryMap<ElementId, InputHandlers>,
    pub(crate) child_area_hooks: SecondaryMap<ElementId, ChildAreaHook>,

    pub(crate) events: Vec<ElementEvent>,
}

impl UiContext {
    pub fn new(viewport: Size) -> Self {
        UiContext {
            elements: SlotMap::with_key(),
            roots: ChildList::new(),
            viewport,
            names: HashMap::new(),
            next_stamp: 0,
            capture: None,
            old_capture: None,
            modal: None,
            focus: None,
            cursor_pos: Vec2::ZERO,
            modifiers: Modifiers::default(),
            hover: ChildList::new(),
            repeat: None,
            drag: None,
            handlers: SecondaryMap::new(),
            child_area_hooks: SecondaryMap::new(),
            events: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Resizes the display/viewport that roots resolve against.
    pub fn set_viewport(&mut self, size: Size) {
        if size == self.viewport {
            return;
        }
        self.viewport = size;
        let roots = self.roots.clone();
        for r in roots {
            self.resolve_subtree(r, true);
        }
    }

    // ------------------------------------------------------------------
    // Element lifecycle
    // ------------------------------------------------------------------

    /// Creates a detached element. Names are unique per context.
    pub fn create_element(&mut self, name: impl Into<String>) -> Result<ElementId> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(Error::InvalidRequest(format!(
                "element name '{name}' already in use"
            )));
        }
        let id = self.elements.insert(Element::new(name.clone()));
        self.names.insert(name, id);
        Ok(id)
    }

    /// Registers a detached element as a root resolving against the viewport.
    pub fn add_root(&mut self, id: ElementId) -> Result<()> {
        let el = self.checked(id)?;
        if el.parent.is_some() || self.roots.contains(&id) {
            return Err(Error::InvalidHierarchy(format!(
                "'{}' is already attached",
                self.elements[id].name
            )));
        }
        self.band_insert(None, id);
        self.resolve_subtree(id, true);
        Ok(())
    }

    /// Attaches `child` under `parent`. Rejects double-attach, self-parenting
    /// and cycles with `InvalidHierarchy`.
    pub fn attach(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        self.checked(parent)?;
        self.checked(child)?;
        if parent == child {
            return Err(Error::InvalidHierarchy(
                "cannot attach an element to itself".into(),
            ));
        }
        if self.elements[child].parent.is_some() || self.roots.contains(&child) {
            return Err(Error::InvalidHierarchy(format!(
                "'{}' is already attached",
                self.elements[child].name
            )));
        }
        if self.is_ancestor(child, parent) {
            return Err(Error::InvalidHierarchy(format!(
                "'{}' is a descendant of '{}'",
                self.elements[parent].name, self.elements[child].name
            )));
        }
        self.elements[child].parent = Some(parent);
        self.elements[parent].children.push(child);
        self.band_insert(Some(parent), child);
        // The ancestor chain changed; every cached clip below is suspect.
        self.resolve_subtree(child, true);
        Ok(())
    }

    /// Detaches an element from its parent (or from the roots). The element
    /// stays alive, unattached and unrendered.
    pub fn detach(&mut self, child: ElementId) -> Result<()> {
        self.checked(child)?;
        if self.elements[child].parent.is_none() && !self.roots.contains(&child) {
            return Err(Error::InvalidHierarchy(format!(
                "'{}' is not attached",
                self.elements[child].name
            )));
        }
        self.unlink(child);
        self.invalidate_clip_subtree(child);
        Ok(())
    }

    /// Destroys an element. Children with `destroyed_by_parent` set are
    /// destroyed recursively; the rest are detached and stay alive.
    /// Synchronously ends any capture, drag or repeat interaction the
    /// destroyed subtree was involved in.
    pub fn destroy(&mut self, id: ElementId) -> Result<()> {
        self.checked(id)?;
        self.unlink(id);
        self.destroy_recursive(id);
        Ok(())
    }

    fn unlink(&mut self, id: ElementId) {
        if let Some(p) = self.elements[id].parent.take() {
            self.elements[p].children.retain(|c| *c != id);
            self.elements[p].draw_list.retain(|c| *c != id);
        } else {
            self.roots.retain(|r| *r != id);
        }
    }

    fn destroy_recursive(&mut self, id: ElementId) {
        if self.capture == Some(id) {
            self.release_capture();
        }
        if self.old_capture == Some(id) {
            self.old_capture = None;
        }
        if self.modal == Some(id) {
            self.modal = None;
        }
        if self.focus == Some(id) {
            self.focus = None;
        }
        let drag_item = self.drag.as_ref().map(|d| d.item);
        let drag_target = self.drag.as_ref().and_then(|d| d.target);
        if drag_item == Some(id) {
            self.cancel_drag();
        } else if drag_target == Some(id) {
            if let Some(d) = self.drag.as_mut() {
                d.target = None;
            }
        }
        if matches!(&self.repeat, Some(r) if r.element == id) {
            self.repeat = None;
        }
        self.hover.retain(|h| *h != id);

        let kids: ChildList = self.elements[id].children.clone();
        for c in kids {
            self.elements[c].parent = None;
            if self.elements[c].layout.destroyed_by_parent {
                self.destroy_recursive(c);
            } else {
                self.invalidate_clip_subtree(c);
            }
        }

        if let Some(el) = self.elements.remove(id) {
            self.names.remove(&el.name);
        }
        self.handlers.remove(id);
        self.child_area_hooks.remove(id);
    }

    // ------------------------------------------------------------------
    // Lookup & access
    // ------------------------------------------------------------------

    pub fn is_alive(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub(crate) fn checked(&self, id: ElementId) -> Result<&Element> {
        self.elements
            .get(id)
            .ok_or_else(|| Error::UnknownObject(format!("{id:?}")))
    }

    /// Name lookup; `UnknownObject` on miss.
    pub fn find(&self, name: &str) -> Result<ElementId> {
        self.find_opt(name)
            .ok_or_else(|| Error::UnknownObject(name.into()))
    }

    pub fn find_opt(&self, name: &str) -> Option<ElementId> {
        self.names.get(name).copied()
    }

    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    pub fn child_at(&self, parent: ElementId, index: usize) -> Result<ElementId> {
        let el = self.checked(parent)?;
        el.children
            .get(index)
            .copied()
            .ok_or_else(|| Error::UnknownObject(format!("{}[{index}]", el.name)))
    }

    pub fn is_ancestor(&self, ancestor: ElementId, of: ElementId) -> bool {
        let mut cur = self.elements.get(of).and_then(|e| e.parent);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.elements[p].parent;
        }
        false
    }

    /// Own visibility flag AND all ancestors'.
    pub fn is_effectively_visible(&self, id: ElementId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            match self.elements.get(c) {
                Some(el) if el.render.visible => cur = el.parent,
                _ => return false,
            }
        }
        true
    }

    // ------------------------------------------------------------------
    // Coordinate conversion
    // ------------------------------------------------------------------

    pub fn screen_to_local(&self, id: ElementId, p: Vec2) -> Result<Vec2> {
        let el = self.checked(id)?;
        Ok(Vec2::new(p.x - el.pixel_rect.x, p.y - el.pixel_rect.y))
    }

    pub fn local_to_screen(&self, id: ElementId, p: Vec2) -> Result<Vec2> {
        let el = self.checked(id)?;
        Ok(Vec2::new(p.x + el.pixel_rect.x, p.y + el.pixel_rect.y))
    }

    pub(crate) fn to_local(&self, id: ElementId, p: Vec2) -> Vec2 {
        let r = self.elements[id].pixel_rect;
        Vec2::new(p.x - r.x, p.y - r.y)
    }

    // ------------------------------------------------------------------
    // Area & layout mutation
    // ------------------------------------------------------------------

    /// Sets position and size in unit dimensions. If the resolved rectangle
    /// is unchanged within epsilon this is a silent no-op: no events fire and
    /// no cache is invalidated.
    pub fn set_area(&mut self, id: ElementId, pos: UnitPoint, size: UnitSize) -> Result<()> {
        self.checked(id)?;
        self.elements[id].area = UnitRect::new(pos, size);
        self.resolve_subtree(id, false);
        Ok(())
    }

    pub fn set_position(&mut self, id: ElementId, pos: UnitPoint) -> Result<()> {
        let size = self.checked(id)?.area.size;
        self.set_area(id, pos, size)
    }

    pub fn set_size(&mut self, id: ElementId, size: UnitSize) -> Result<()> {
        let pos = self.checked(id)?.area.pos;
        self.set_area(id, pos, size)
    }

    pub fn set_min_size(&mut self, id: ElementId, min: UnitSize) -> Result<()> {
        self.checked(id)?;
        self.elements[id].min_size = min;
        self.resolve_subtree(id, false);
        Ok(())
    }

    pub fn set_max_size(&mut self, id: ElementId, max: UnitSize) -> Result<()> {
        self.checked(id)?;
        self.elements[id].max_size = max;
        self.resolve_subtree(id, false);
        Ok(())
    }

    pub fn set_aspect(&mut self, id: ElementId, mode: AspectMode, ratio: f32) -> Result<()> {
        self.checked(id)?;
        let el = &mut self.elements[id];
        el.aspect_mode = mode;
        el.aspect_ratio = ratio;
        self.resolve_subtree(id, false);
        Ok(())
    }

    /// Rotation and pivot are forwarded to the render layer as a transform
    /// hint; clip and hit rectangles stay axis-aligned.
    pub fn set_rotation(&mut self, id: ElementId, radians: f32, pivot: Vec2) -> Result<()> {
        self.checked(id)?;
        let el = &mut self.elements[id];
        el.rotation = radians;
        el.pivot = pivot;
        self.mark_redraw(id);
        Ok(())
    }

    pub fn set_insets(&mut self, id: ElementId, insets: Insets) -> Result<()> {
        self.checked(id)?;
        if self.elements[id].insets == insets {
            return Ok(());
        }
        self.elements[id].insets = insets;
        self.invalidate_clip_subtree(id);
        let kids: ChildList = self.elements[id].children.clone();
        for c in kids {
            self.resolve_subtree(c, true);
        }
        Ok(())
    }

    /// Skin/theme hook overriding the area children resolve against.
    pub fn set_child_area_hook(&mut self, id: ElementId, hook: ChildAreaHook) -> Result<()> {
        self.checked(id)?;
        self.child_area_hooks.insert(id, hook);
        self.invalidate_clip_subtree(id);
        let kids: ChildList = self.elements[id].children.clone();
        for c in kids {
            self.resolve_subtree(c, true);
        }
        Ok(())
    }

    /// Area available for children: the outer rect shrunk by insets, or the
    /// child-area hook's answer when one is installed.
    pub(crate) fn inner_unclipped(&self, id: ElementId) -> Rect {
        let el = &self.elements[id];
        match self.child_area_hooks.get(id) {
            Some(hook) => hook(el.pixel_rect),
            None => el.insets.shrink(el.pixel_rect),
        }
    }

    /// Re-resolves `id` and its subtree against current parent extents.
    /// Fires `Moved`/`Sized` per element whose rect actually changed and
    /// invalidates clip caches where the chain changed.
    pub(crate) fn resolve_subtree(&mut self, id: ElementId, ancestor_changed: bool) {
        let basis = match self.elements[id].parent {
            Some(p) => self.inner_unclipped(p),
            None => Rect::from_size(self.viewport),
        };
        let viewport = self.viewport;

        let el = &mut self.elements[id];
        let pos = el.area.pos.resolve(basis.size());
        let raw = el.area.size.resolve(basis.size());
        let fitted = apply_aspect(raw, el.aspect_mode, el.aspect_ratio);
        let size = clamp_size(
            fitted,
            el.min_size.resolve(viewport),
            el.max_size.resolve(viewport),
        );
        let new = Rect::new(basis.x + pos.x, basis.y + pos.y, size.width, size.height);
        let old = el.pixel_rect;
        let moved =
            (new.x - old.x).abs() > AREA_EPSILON || (new.y - old.y).abs() > AREA_EPSILON;
        let sized =
            (new.w - old.w).abs() > AREA_EPSILON || (new.h - old.h).abs() > AREA_EPSILON;
        el.pixel_rect = new;
        let changed = moved || sized;
        if changed || ancestor_changed {
            el.clip.invalidate();
        }
        if sized {
            // Geometry is a function of size; a pure move keeps the cache
            // and only shifts the buffer translation.
            el.needs_redraw = true;
            self.next_stamp += 1;
            el.stamp = self.next_stamp;
        }
        if moved {
            self.events.push(ElementEvent::Moved { element: id });
        }
        if sized {
            self.events.push(ElementEvent::Sized { element: id });
        }

        let kids: ChildList = self.elements[id].children.clone();
        for c in kids {
            self.resolve_subtree(c, ancestor_changed || changed);
        }
    }

    // ------------------------------------------------------------------
    // Flag & property mutation
    // ------------------------------------------------------------------

    pub fn set_visible(&mut self, id: ElementId, visible: bool) -> Result<()> {
        self.checked(id)?;
        if self.elements[id].render.visible == visible {
            return Ok(());
        }
        self.elements[id].render.visible = visible;
        self.events.push(if visible {
            ElementEvent::Shown { element: id }
        } else {
            ElementEvent::Hidden { element: id }
        });
        if !visible && self.capture == Some(id) {
            self.release_capture();
        }
        if !visible && self.modal == Some(id) {
            self.modal = None;
        }
        Ok(())
    }

    pub fn set_enabled(&mut self, id: ElementId, enabled: bool) -> Result<()> {
        self.checked(id)?;
        if self.elements[id].input.enabled == enabled {
            return Ok(());
        }
        self.elements[id].input.enabled = enabled;
        self.events.push(if enabled {
            ElementEvent::Enabled { element: id }
        } else {
            ElementEvent::Disabled { element: id }
        });
        Ok(())
    }

    pub fn set_clipped_by_parent(&mut self, id: ElementId, clipped: bool) -> Result<()> {
        self.checked(id)?;
        if self.elements[id].layout.clipped_by_parent == clipped {
            return Ok(());
        }
        self.elements[id].layout.clipped_by_parent = clipped;
        self.invalidate_clip_subtree(id);
        Ok(())
    }

    pub fn set_destroyed_by_parent(&mut self, id: ElementId, setting: bool) -> Result<()> {
        self.checked(id)?;
        self.elements[id].layout.destroyed_by_parent = setting;
        Ok(())
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> Result<()> {
        self.checked(id)?;
        let text = text.into();
        if self.elements[id].text == text {
            return Ok(());
        }
        self.elements[id].text = text;
        self.mark_redraw(id);
        self.events.push(ElementEvent::TextChanged { element: id });
        Ok(())
    }

    /// Assigns a named look. The skin engine that interprets the name is
    /// external; the core stores it and invalidates cached geometry.
    pub fn set_look(&mut self, id: ElementId, look: impl Into<String>) -> Result<()> {
        self.checked(id)?;
        self.elements[id].look = Some(look.into());
        self.mark_redraw(id);
        self.events.push(ElementEvent::LookChanged { element: id });
        Ok(())
    }

    pub fn set_input_config(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut crate::element::InputConfig),
    ) -> Result<()> {
        self.checked(id)?;
        f(&mut self.elements[id].input);
        Ok(())
    }

    pub fn set_render_config(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut crate::element::RenderConfig),
    ) -> Result<()> {
        self.checked(id)?;
        let was_on_top = self.elements[id].render.always_on_top;
        f(&mut self.elements[id].render);
        let on_top = self.elements[id].render.always_on_top;
        if was_on_top != on_top {
            // Re-home into the new band through the dedicated path so the
            // draw list invariant holds.
            self.elements[id].render.always_on_top = was_on_top;
            self.set_always_on_top(id, on_top)?;
        }
        Ok(())
    }

    /// Installs the widget layer's input handler table for an element.
    pub fn set_handlers(&mut self, id: ElementId, handlers: InputHandlers) -> Result<()> {
        self.checked(id)?;
        self.handlers.insert(id, handlers);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Geometry cache dirty state (consumed by the render layer)
    // ------------------------------------------------------------------

    /// Marks cached geometry dirty. With `recursive`, cascades to all
    /// descendants. Any auto caching surface covering the element observes
    /// the stamp advance and re-rasterizes.
    pub fn invalidate(&mut self, id: ElementId, recursive: bool) -> Result<()> {
        self.checked(id)?;
        self.invalidate_inner(id, recursive);
        Ok(())
    }

    fn invalidate_inner(&mut self, id: ElementId, recursive: bool) {
        self.mark_redraw(id);
        self.events.push(ElementEvent::Invalidated { element: id });
        if recursive {
            let kids: ChildList = self.elements[id].children.clone();
            for c in kids {
                self.invalidate_inner(c, true);
            }
        }
    }

    pub(crate) fn mark_redraw(&mut self, id: ElementId) {
        self.next_stamp += 1;
        let el = &mut self.elements[id];
        el.needs_redraw = true;
        el.stamp = self.next_stamp;
    }

    pub fn needs_redraw(&self, id: ElementId) -> bool {
        self.elements.get(id).is_some_and(|e| e.needs_redraw)
    }

    /// Called by the render layer after repopulating an element's geometry.
    pub fn clear_redraw(&mut self, id: ElementId) {
        if let Some(el) = self.elements.get_mut(id) {
            el.needs_redraw = false;
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub(crate) fn emit(&mut self, ev: ElementEvent) {
        self.events.push(ev);
    }

    /// Takes all notifications queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<ElementEvent> {
        std::mem::take(&mut self.events)
    }
}
