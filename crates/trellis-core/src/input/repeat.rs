//! Auto-repeat timing for held cursor buttons.
//!
//! Purely cooperative: the state advances only through the per-frame time
//! delta fed to [`UiContext::update`](crate::UiContext::update). A repeat
//! fires once when the delay expires, then at the configured rate until the
//! button is released or capture moves elsewhere.

use crate::element::ElementId;
use crate::input::events::CursorButton;

#[derive(Clone, Copy, Debug)]
pub(crate) struct RepeatState {
    pub element: ElementId,
    pub button: CursorButton,
    pub elapsed: f32,
    pub repeating: bool,
}

impl RepeatState {
    pub fn new(element: ElementId, button: CursorButton) -> Self {
        RepeatState {
            element,
            button,
            elapsed: 0.0,
            repeating: false,
        }
    }

    /// Advances by `dt` seconds and returns how many repeat events are due.
    /// Boundary comparisons carry a small slop so accumulated f32 rounding
    /// never pushes an exact-multiple repeat into the next frame.
    pub fn advance(&mut self, dt: f32, delay: f32, rate: f32) -> u32 {
        const SLOP: f32 = 1e-5;
        let rate = rate.max(1e-4);
        self.elapsed += dt;
        let mut fired = 0;
        if !self.repeating {
            if self.elapsed + SLOP < delay {
                return 0;
            }
            self.repeating = true;
            self.elapsed = (self.elapsed - delay).max(0.0);
            fired += 1;
        }
        while self.elapsed + SLOP >= rate {
            self.elapsed = (self.elapsed - rate).max(0.0);
            fired += 1;
        }
        fired
    }
}
