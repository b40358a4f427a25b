//! # Trellis core: composition tree, layout resolution and input dispatch
//!
//! Trellis is a retained-mode UI composition core. Applications build a tree
//! of [`Element`]s inside a [`UiContext`], describe each element's area in
//! unit dimensions (a relative fraction of the parent plus an absolute pixel
//! offset), and inject cursor/keyboard events plus a per-frame time delta.
//! The context resolves pixel rectangles eagerly, keeps lazily revalidated
//! clip and hit rectangles, maintains two-band z-ordered draw lists, and
//! routes input through capture, hit descent and parent propagation.
//!
//! ```rust
//! use trellis_core::*;
//!
//! let mut ui = UiContext::new(Size::new(800.0, 600.0));
//! let root = ui.create_element("root").unwrap();
//! ui.add_root(root).unwrap();
//! ui.set_area(root, UnitPoint::ZERO, UnitSize::rel(1.0, 1.0)).unwrap();
//!
//! let panel = ui.create_element("panel").unwrap();
//! ui.attach(root, panel).unwrap();
//! ui.set_area(panel, UnitPoint::px(10.0, 10.0), UnitSize::px(200.0, 100.0)).unwrap();
//! assert_eq!(ui.element(panel).unwrap().pixel_rect(), Rect::new(10.0, 10.0, 200.0, 100.0));
//! ```
//!
//! Everything is single threaded: one context is one logical UI thread, and
//! timing (auto-repeat, drag target refresh) advances only through
//! [`UiContext::update`].
//!
//! Rendering lives in the companion `trellis-render` crate, which walks
//! [`UiContext::roots`] in draw order and consults the dirty flags and
//! invalidation stamps maintained here.

pub mod clip;
pub mod context;
pub mod element;
pub mod error;
pub mod events;
pub mod geometry;
pub mod input;
pub mod tests;
pub mod units;
pub mod zorder;

pub use context::{ChildAreaHook, UiContext, AREA_EPSILON};
pub use element::{DrawModeMask, Element, ElementId, InputConfig, LayoutConfig, RenderConfig};
pub use error::{Error, Result};
pub use events::ElementEvent;
pub use geometry::{Insets, Rect, Size, Vec2};
pub use input::{CursorButton, CursorEvent, InputHandlers, KeyEvent, Modifiers};
pub use units::{AspectMode, UnitPoint, UnitRect, UnitSize, UnitValue};
