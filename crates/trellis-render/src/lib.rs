//! # Trellis render: geometry caching and the frame walk
//!
//! This crate turns a `trellis-core` composition tree into backend draw
//! calls. It owns no GPU code: backends implement [`RenderBackend`] and
//! receive retained [`GeometryBuffer`]s in draw order. Per-element geometry
//! is cached and repainted only when the core marks it dirty; elements
//! flagged for auto caching surfaces are rasterized offscreen and
//! composited until their subtree's invalidation stamp advances.
//!
//! ```rust,ignore
//! let mut compositor = Compositor::new();
//! compositor.set_painter(panel, Rc::new(|el, buf| {
//!     buf.push_quad(Rect::from_size(el.pixel_rect().size()), Color::WHITE);
//! }));
//! compositor.render_frame(&mut ui, &mut backend, DrawModeMask::MAIN)?;
//! ```

pub mod buffer;
pub mod cache;
pub mod error;
pub mod frame;
pub mod surface;

pub use buffer::{BlendMode, Color, GeometryBuffer, TextureHandle, Vertex, VertexBatch};
pub use cache::{GeometryStore, Painter};
pub use error::{RenderError, Result};
pub use frame::Compositor;
pub use surface::{CachingSurface, RenderBackend, TextureTarget};
