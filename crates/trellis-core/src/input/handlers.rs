//! Per-element handler table installed by the widget layer.
//!
//! Handlers are plain `Rc` closures; a cursor/key handler returns whether it
//! handled the event — unhandled events are re-offered up the parent chain
//! when propagation is enabled.

use std::rc::Rc;

use crate::element::ElementId;
use crate::geometry::Vec2;
use crate::input::events::{CursorEvent, KeyEvent};

pub type CursorHandler = Rc<dyn Fn(&CursorEvent) -> bool>;
pub type KeyHandler = Rc<dyn Fn(&KeyEvent) -> bool>;
/// Custom hit test over a local-space point.
pub type HitTestHandler = Rc<dyn Fn(Vec2) -> bool>;
/// Drop decision for a dragged item; returning `false` rejects the drop.
pub type DropHandler = Rc<dyn Fn(ElementId) -> bool>;

#[derive(Clone, Default)]
pub struct InputHandlers {
    pub on_cursor_press: Option<CursorHandler>,
    pub on_cursor_release: Option<CursorHandler>,
    pub on_cursor_move: Option<CursorHandler>,
    pub on_key: Option<KeyHandler>,
    /// Overrides the default rect-containment hit test.
    pub is_hit: Option<HitTestHandler>,
    pub on_drop: Option<DropHandler>,
}

impl InputHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_cursor_press(mut self, f: impl Fn(&CursorEvent) -> bool + 'static) -> Self {
        self.on_cursor_press = Some(Rc::new(f));
        self
    }

    pub fn on_cursor_release(mut self, f: impl Fn(&CursorEvent) -> bool + 'static) -> Self {
        self.on_cursor_release = Some(Rc::new(f));
        self
    }

    pub fn on_cursor_move(mut self, f: impl Fn(&CursorEvent) -> bool + 'static) -> Self {
        self.on_cursor_move = Some(Rc::new(f));
        self
    }

    pub fn on_key(mut self, f: impl Fn(&KeyEvent) -> bool + 'static) -> Self {
        self.on_key = Some(Rc::new(f));
        self
    }

    pub fn is_hit(mut self, f: impl Fn(Vec2) -> bool + 'static) -> Self {
        self.is_hit = Some(Rc::new(f));
        self
    }

    pub fn on_drop(mut self, f: impl Fn(ElementId) -> bool + 'static) -> Self {
        self.on_drop = Some(Rc::new(f));
        self
    }
}
