//! Per-element geometry caching.
//!
//! The widget/skin layer registers a painter per element; the store runs it
//! only when the core reports the element dirty, and otherwise re-submits
//! the cached vertices. A pure move never repaints: the compositor just
//! updates the buffer's translation.

use std::rc::Rc;

use slotmap::SecondaryMap;
use trellis_core::{Element, ElementId, UiContext};

use crate::buffer::GeometryBuffer;

/// Fills a buffer with an element's local-space geometry. Invoked only when
/// the element's cache is dirty.
pub type Painter = Rc<dyn Fn(&Element, &mut GeometryBuffer)>;

#[derive(Default)]
pub struct GeometryStore {
    painters: SecondaryMap<ElementId, Painter>,
    buffers: SecondaryMap<ElementId, GeometryBuffer>,
}

impl GeometryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_painter(&mut self, id: ElementId, painter: Painter) {
        self.painters.insert(id, painter);
        // Force a repaint with the new painter on next frame.
        self.buffers.remove(id);
    }

    /// Repaints if dirty (or never painted), then hands out the buffer.
    /// Elements without a painter get an empty buffer.
    pub fn refresh(&mut self, ui: &mut UiContext, id: ElementId) -> Option<&mut GeometryBuffer> {
        let el = ui.element(id)?;
        let dirty = el.needs_redraw() || !self.buffers.contains_key(id);
        if dirty {
            let mut buf = self.buffers.remove(id).unwrap_or_default();
            buf.clear();
            if let Some(p) = self.painters.get(id) {
                p(el, &mut buf);
            }
            self.buffers.insert(id, buf);
            ui.clear_redraw(id);
        }
        self.buffers.get_mut(id)
    }

    /// Drops cached state for elements that no longer exist.
    pub fn sweep(&mut self, ui: &UiContext) {
        self.buffers.retain(|id, _| ui.is_alive(id));
        self.painters.retain(|id, _| ui.is_alive(id));
    }
}
