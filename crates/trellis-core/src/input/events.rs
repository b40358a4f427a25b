use crate::geometry::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CursorButton {
    Left,
    Right,
    Middle,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

/// A pointer event as delivered to element handlers.
#[derive(Clone, Copy, Debug)]
pub struct CursorEvent {
    /// Screen-space position.
    pub position: Vec2,
    /// Position converted to the receiving element's local space.
    pub local: Vec2,
    /// Button involved, if any (presses/releases; `None` for moves).
    pub button: Option<CursorButton>,
    pub modifiers: Modifiers,
    /// Set on presses synthesized by auto-repeat. Repeats never form clicks.
    pub repeated: bool,
}

/// A keyboard event. Key identity is the platform scancode plus an optional
/// translated character; interpretation belongs to the widget layer.
#[derive(Clone, Copy, Debug)]
pub struct KeyEvent {
    pub code: u32,
    pub ch: Option<char>,
    pub modifiers: Modifiers,
    pub pressed: bool,
}
