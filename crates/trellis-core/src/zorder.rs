//! Z-order operations over per-parent draw lists.
//!
//! A draw list is partitioned into two bands: normal children first, then
//! always-on-top children; within a band, later entries draw in front.
//! Moves between elements with different band flags, with z-ordering
//! disabled, or with ineligible siblings are silent no-ops — UI code calls
//! these speculatively.

use crate::element::{ChildList, ElementId};
use crate::events::ElementEvent;
use crate::UiContext;

impl UiContext {
    /// Moves an element to the front (topmost) of its band.
    pub fn move_to_front(&mut self, id: ElementId) {
        self.band_move(id, BandTarget::Front);
    }

    /// Moves an element to the back of its band. An always-on-top element
    /// moved to back still draws in front of every normal sibling.
    pub fn move_to_back(&mut self, id: ElementId) {
        self.band_move(id, BandTarget::Back);
    }

    /// Places `id` directly in front of `sibling`. Silent no-op unless both
    /// are live true siblings in the same band and `id` has z-ordering
    /// enabled.
    pub fn move_in_front(&mut self, id: ElementId, sibling: ElementId) {
        self.relative_move(id, sibling, true);
    }

    /// Places `id` directly behind `sibling`; same eligibility rules as
    /// [`move_in_front`](Self::move_in_front).
    pub fn move_behind(&mut self, id: ElementId, sibling: ElementId) {
        self.relative_move(id, sibling, false);
    }

    /// Position in the sibling draw list (higher = drawn later = in front).
    /// Only meaningful among siblings; not stable across structural changes.
    pub fn z_index(&self, id: ElementId) -> Option<usize> {
        let el = self.elements.get(id)?;
        let list: &[ElementId] = match el.parent {
            Some(p) => &self.elements[p].draw_list,
            None => &self.roots,
        };
        list.iter().position(|&c| c == id)
    }

    /// Moves an element between bands, re-homing it to the front of the new
    /// band.
    pub fn set_always_on_top(&mut self, id: ElementId, on_top: bool) -> crate::Result<()> {
        self.checked(id)?;
        if self.elements[id].render.always_on_top == on_top {
            return Ok(());
        }
        let parent = self.elements[id].parent;
        let attached = parent.is_some() || self.roots.contains(&id);
        if attached {
            self.with_sibling_list(parent, |_, list| list.retain(|c| *c != id));
        }
        self.elements[id].render.always_on_top = on_top;
        if attached {
            self.band_insert(parent, id);
        }
        self.emit(ElementEvent::ZOrderChanged { element: id });
        Ok(())
    }

    /// Brings the whole ancestor chain to the front of each band, root
    /// first. Used by click-to-rise and explicit activation.
    pub(crate) fn rise_chain(&mut self, id: ElementId) {
        if let Some(p) = self.elements.get(id).and_then(|e| e.parent) {
            self.rise_chain(p);
        }
        self.move_to_front(id);
    }

    /// Appends `id` at the top of its band in `parent`'s draw list (or the
    /// root list).
    pub(crate) fn band_insert(&mut self, parent: Option<ElementId>, id: ElementId) {
        let on_top = self.elements[id].render.always_on_top;
        self.with_sibling_list(parent, |ctx, list| {
            let at = if on_top {
                list.len()
            } else {
                ctx.first_on_top_index(list)
            };
            list.insert(at, id);
        });
    }

    fn band_move(&mut self, id: ElementId, target: BandTarget) {
        let Some(el) = self.elements.get(id) else {
            return;
        };
        if !el.render.z_order_enabled {
            return;
        }
        let parent = el.parent;
        let on_top = el.render.always_on_top;
        let changed = self.with_sibling_list(parent, |ctx, list| {
            let Some(pos) = list.iter().position(|&c| c == id) else {
                return false;
            };
            list.remove(pos);
            let at = match (target, on_top) {
                (BandTarget::Front, true) => list.len(),
                (BandTarget::Front, false) => ctx.first_on_top_index(list),
                (BandTarget::Back, true) => ctx.first_on_top_index(list),
                (BandTarget::Back, false) => 0,
            };
            list.insert(at, id);
            at != pos
        });
        if changed {
            self.emit(ElementEvent::ZOrderChanged { element: id });
        }
    }

    fn relative_move(&mut self, id: ElementId, sibling: ElementId, in_front: bool) {
        if id == sibling {
            return;
        }
        let (Some(el), Some(sib)) = (self.elements.get(id), self.elements.get(sibling)) else {
            return;
        };
        if !el.render.z_order_enabled {
            return;
        }
        if el.parent != sib.parent {
            return;
        }
        if el.render.always_on_top != sib.render.always_on_top {
            return;
        }
        let parent = el.parent;
        let changed = self.with_sibling_list(parent, |_, list| {
            let Some(pos) = list.iter().position(|&c| c == id) else {
                return false;
            };
            let Some(mut sib_pos) = list.iter().position(|&c| c == sibling) else {
                return false;
            };
            list.remove(pos);
            if pos < sib_pos {
                sib_pos -= 1;
            }
            let at = if in_front { sib_pos + 1 } else { sib_pos };
            list.insert(at, id);
            at != pos
        });
        if changed {
            self.emit(ElementEvent::ZOrderChanged { element: id });
        }
    }

    /// Index of the first always-on-top entry; the normal band ends there.
    fn first_on_top_index(&self, list: &[ElementId]) -> usize {
        list.iter()
            .position(|&c| self.elements[c].render.always_on_top)
            .unwrap_or(list.len())
    }

    /// Runs `f` with the sibling draw list for `parent` temporarily moved
    /// out, so the closure may consult the arena while mutating the list.
    fn with_sibling_list<R>(
        &mut self,
        parent: Option<ElementId>,
        f: impl FnOnce(&Self, &mut ChildList) -> R,
    ) -> R {
        let mut list = match parent {
            Some(p) => std::mem::take(&mut self.elements[p].draw_list),
            None => std::mem::take(&mut self.roots),
        };
        let r = f(self, &mut list);
        match parent {
            Some(p) => self.elements[p].draw_list = list,
            None => self.roots = list,
        }
        r
    }
}

#[derive(Clone, Copy)]
enum BandTarget {
    Front,
    Back,
}
