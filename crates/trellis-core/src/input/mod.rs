//! Input capture and dispatch: pointer routing down the z-ordered tree,
//! the exclusive capture slot, auto-repeat timing and the drag-and-drop
//! handshake.

pub mod dispatch;
pub mod dragdrop;
pub mod events;
pub mod handlers;
pub mod repeat;

pub use events::{CursorButton, CursorEvent, KeyEvent, Modifiers};
pub use handlers::InputHandlers;
