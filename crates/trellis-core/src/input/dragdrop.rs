//! Drag-drop handshake: a dragged payload, a tracked drop target, and the
//! enters/leaves/dropped edge events.
//!
//! The payload holds pointer capture for the duration of the drag so it
//! keeps receiving cursor moves, and is excluded from hit tests so it never
//! becomes its own drop target. Targets are found by hit-testing under the
//! cursor and walking up to the nearest ancestor that accepts drops.

use crate::element::ElementId;
use crate::error::{Error, Result};
use crate::events::ElementEvent;
use crate::UiContext;

pub(crate) struct DragState {
    pub item: ElementId,
    pub target: Option<ElementId>,
}

impl UiContext {
    /// The payload of the drag in progress, if any.
    pub fn drag_item(&self) -> Option<ElementId> {
        self.drag.as_ref().map(|d| d.item)
    }

    /// The drop target currently under the dragged payload, if any.
    pub fn drag_target(&self) -> Option<ElementId> {
        self.drag.as_ref().and_then(|d| d.target)
    }

    /// Begins dragging `item`. The payload takes pointer capture and stops
    /// participating in hit tests until the drag ends.
    pub fn start_drag(&mut self, item: ElementId) -> Result<()> {
        self.checked(item)?;
        if self.drag.is_some() {
            return Err(Error::InvalidRequest(
                "a drag is already in progress".into(),
            ));
        }
        self.capture(item)?;
        self.drag = Some(DragState { item, target: None });
        self.update_drag_target();
        Ok(())
    }

    /// Completes the drag over whatever target is current. Fires
    /// `DragDropItemDropped` with the target's accept/reject verdict; with
    /// no target the drag simply dissolves. A sticky payload that was
    /// rejected keeps dragging.
    pub fn end_drag(&mut self) {
        let Some(state) = self.drag.take() else {
            return;
        };
        let item = state.item;
        if let Some(target) = state.target.filter(|t| self.elements.contains_key(*t)) {
            let accepted = self
                .handlers
                .get(target)
                .and_then(|h| h.on_drop.clone())
                .map(|f| f(item))
                .unwrap_or(false);
            self.emit(ElementEvent::DragDropItemDropped {
                target,
                item,
                accepted,
            });
            let sticky =
                self.elements.get(item).is_some_and(|e| e.input.sticky_drag);
            if !accepted && sticky {
                self.drag = Some(DragState {
                    item,
                    target: Some(target),
                });
                return;
            }
        }
        if self.capture == Some(item) {
            self.release_capture();
        }
    }

    /// Abandons the drag without a drop. The current target gets a leave
    /// edge; no dropped event fires.
    pub fn cancel_drag(&mut self) {
        let Some(state) = self.drag.take() else {
            return;
        };
        if let Some(target) = state.target.filter(|t| self.elements.contains_key(*t)) {
            self.emit(ElementEvent::DragDropItemLeaves {
                target,
                item: state.item,
            });
        }
        // The drag slot is already empty, so this goes through the ordinary
        // release path: saved holders are restored, otherwise CaptureLost
        // fires on the payload.
        if self.capture == Some(state.item) {
            self.release_capture();
        }
    }

    /// Re-evaluates which drop target sits under the cursor and fires
    /// enter/leave edges when it changes. No-op when no drag is active or
    /// the target is unchanged.
    pub(crate) fn update_drag_target(&mut self) {
        let Some(item) = self.drag.as_ref().map(|d| d.item) else {
            return;
        };
        let hit = self.hit_test_filtered(self.cursor_pos, false, Some(item));
        let fresh = self.nearest_drop_target(hit);
        let prev = self
            .drag
            .as_ref()
            .and_then(|d| d.target)
            .filter(|t| self.elements.contains_key(*t));
        if fresh == prev {
            return;
        }
        if let Some(old) = prev {
            self.emit(ElementEvent::DragDropItemLeaves { target: old, item });
        }
        if let Some(new) = fresh {
            self.emit(ElementEvent::DragDropItemEnters { target: new, item });
        }
        if let Some(d) = self.drag.as_mut() {
            d.target = fresh;
        }
    }

    /// Nearest self-or-ancestor of the hit element that accepts drops.
    fn nearest_drop_target(&self, hit: Option<ElementId>) -> Option<ElementId> {
        let mut cur = hit;
        while let Some(id) = cur {
            let el = self.elements.get(id)?;
            if el.input.drag_drop_target {
                return Some(id);
            }
            cur = el.parent;
        }
        None
    }
}
