//! Notifications surfaced to subscribers through the context event queue.

use crate::element::ElementId;
use crate::geometry::Vec2;
use crate::input::CursorButton;

/// A notification produced by tree mutation or input dispatch. Each carries
/// the originating element and, where relevant, the other involved element.
/// Drained per tick via [`UiContext::drain_events`](crate::UiContext::drain_events).
#[derive(Clone, Debug, PartialEq)]
pub enum ElementEvent {
    /// Resolved position changed beyond epsilon.
    Moved { element: ElementId },
    /// Resolved size changed beyond epsilon.
    Sized { element: ElementId },
    TextChanged { element: ElementId },
    LookChanged { element: ElementId },
    Shown { element: ElementId },
    Hidden { element: ElementId },
    Enabled { element: ElementId },
    Disabled { element: ElementId },
    CaptureGained { element: ElementId },
    CaptureLost { element: ElementId },
    ZOrderChanged { element: ElementId },
    /// Cached geometry was explicitly invalidated.
    Invalidated { element: ElementId },
    CursorEntered { element: ElementId },
    CursorLeft { element: ElementId },
    CursorMoved {
        element: ElementId,
        /// Position in the element's local space.
        position: Vec2,
    },
    CursorPressed {
        element: ElementId,
        button: CursorButton,
        /// True for presses synthesized by auto-repeat.
        repeated: bool,
    },
    CursorReleased {
        element: ElementId,
        button: CursorButton,
    },
    DragDropItemEnters {
        target: ElementId,
        item: ElementId,
    },
    DragDropItemLeaves {
        target: ElementId,
        item: ElementId,
    },
    DragDropItemDropped {
        target: ElementId,
        item: ElementId,
        accepted: bool,
    },
}

impl ElementEvent {
    /// The element the notification originates from.
    pub fn element(&self) -> ElementId {
        use ElementEvent::*;
        match *self {
            Moved { element }
            | Sized { element }
            | TextChanged { element }
            | LookChanged { element }
            | Shown { element }
            | Hidden { element }
            | Enabled { element }
            | Disabled { element }
            | CaptureGained { element }
            | CaptureLost { element }
            | ZOrderChanged { element }
            | Invalidated { element }
            | CursorEntered { element }
            | CursorLeft { element }
            | CursorMoved { element, .. }
            | CursorPressed { element, .. }
            | CursorReleased { element, .. } => element,
            DragDropItemEnters { target, .. }
            | DragDropItemLeaves { target, .. }
            | DragDropItemDropped { target, .. } => target,
        }
    }
}
