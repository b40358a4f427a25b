//! Lazily computed clip rectangles.
//!
//! Each element caches three screen-space rects: the outer clip (area the
//! whole element may render into), the inner clip (area for client content)
//! and the hit-test rect. Invalidation flips a validity flag; recomputation
//! happens on the next read, intersecting with the nearest clipping
//! ancestor's recursively-valid rects. Every public getter revalidates
//! first, so a stale rect is never observable.

use crate::element::{ChildList, ElementId};
use crate::geometry::Rect;
use crate::UiContext;

impl UiContext {
    /// Area available for the whole element, clipped by the ancestor chain.
    pub fn outer_clip(&mut self, id: ElementId) -> Rect {
        if let Some(el) = self.elements.get(id) {
            if el.clip.outer_valid {
                return el.clip.outer;
            }
        } else {
            return Rect::default();
        }
        let r = self.compute_outer_clip(id);
        let el = &mut self.elements[id];
        el.clip.outer = r;
        el.clip.outer_valid = true;
        r
    }

    /// Area available for client content, clipped by the ancestor chain.
    pub fn inner_clip(&mut self, id: ElementId) -> Rect {
        if let Some(el) = self.elements.get(id) {
            if el.clip.inner_valid {
                return el.clip.inner;
            }
        } else {
            return Rect::default();
        }
        let outer = self.outer_clip(id);
        let r = self.inner_unclipped(id).intersect(&outer);
        let el = &mut self.elements[id];
        el.clip.inner = r;
        el.clip.inner_valid = true;
        r
    }

    /// Rect used for point-in-element tests. Nested inside the parent's hit
    /// rect while clipping is enabled.
    pub fn hit_rect(&mut self, id: ElementId) -> Rect {
        if let Some(el) = self.elements.get(id) {
            if el.clip.hit_valid {
                return el.clip.hit;
            }
        } else {
            return Rect::default();
        }
        let r = self.compute_hit_rect(id);
        let el = &mut self.elements[id];
        el.clip.hit = r;
        el.clip.hit_valid = true;
        r
    }

    fn compute_outer_clip(&mut self, id: ElementId) -> Rect {
        let base = self.elements[id].pixel_rect;
        let viewport = Rect::from_size(self.viewport);
        if !self.elements[id].layout.clipped_by_parent {
            return base.intersect(&viewport);
        }
        match self.elements[id].parent {
            Some(p) => base.intersect(&self.inner_clip(p)),
            None => base.intersect(&viewport),
        }
    }

    fn compute_hit_rect(&mut self, id: ElementId) -> Rect {
        let base = self.elements[id].pixel_rect;
        let viewport = Rect::from_size(self.viewport);
        if !self.elements[id].layout.clipped_by_parent {
            return base.intersect(&viewport);
        }
        match self.elements[id].parent {
            Some(p) => base.intersect(&self.hit_rect(p)),
            None => base.intersect(&viewport),
        }
    }

    /// Validity probe, mostly for tests and debug overlays.
    pub fn clip_caches_valid(&self, id: ElementId) -> bool {
        self.elements
            .get(id)
            .map(|e| e.clip.outer_valid && e.clip.inner_valid && e.clip.hit_valid)
            .unwrap_or(false)
    }

    /// Marks every clip rect in the subtree invalid. Used when an ancestor's
    /// geometry or clipping configuration changed in a way descendants
    /// cannot absorb locally.
    pub(crate) fn invalidate_clip_subtree(&mut self, id: ElementId) {
        let Some(el) = self.elements.get_mut(id) else {
            return;
        };
        el.clip.invalidate();
        let kids: ChildList = el.children.clone();
        for c in kids {
            self.invalidate_clip_subtree(c);
        }
    }
}
