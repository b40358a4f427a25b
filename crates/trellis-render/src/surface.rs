//! Backend abstraction and offscreen caching surfaces.
//!
//! The compositor talks to a [`RenderBackend`] only through submitted
//! [`GeometryBuffer`]s and, optionally, offscreen [`TextureTarget`]s.
//! Offscreen targets are an optional capability: a backend may answer
//! [`NotSupported`](crate::error::RenderError::NotSupported), and every
//! caller degrades to direct drawing when it does.

use trellis_core::{Rect, Size};

use crate::buffer::{GeometryBuffer, TextureHandle};
use crate::error::Result;

/// An offscreen render target a subtree can be rasterized into.
pub trait TextureTarget {
    fn size(&self) -> Size;
    fn resize(&mut self, size: Size) -> Result<()>;
    /// Handle for sampling the target's content as a texture.
    fn handle(&self) -> TextureHandle;
}

/// A drawing sink. `submit` consumes buffers in draw order between
/// `begin_frame`/`end_frame`; while a target is bound, submissions land in
/// the target instead of the frame.
pub trait RenderBackend {
    fn begin_frame(&mut self, viewport: Size);
    fn submit(&mut self, buffer: &GeometryBuffer);
    fn end_frame(&mut self);

    /// Creates an offscreen target, or `NotSupported`.
    fn create_target(&mut self, size: Size) -> Result<Box<dyn TextureTarget>>;
    /// Redirects subsequent submissions into `target`, clearing it.
    fn bind_target(&mut self, target: &dyn TextureTarget);
    fn unbind_target(&mut self);
    /// Composites a target's content into the frame at `dst`.
    fn blit_target(&mut self, target: &dyn TextureTarget, dst: Rect, clip: Option<Rect>);
}

/// An element's auto caching surface: an offscreen target plus the
/// invalidation stamp its content was rasterized at. The subtree is
/// re-rasterized only when some element in it carries a newer stamp.
pub struct CachingSurface {
    pub target: Box<dyn TextureTarget>,
    pub valid_stamp: u64,
}

impl CachingSurface {
    pub fn new(target: Box<dyn TextureTarget>) -> Self {
        CachingSurface {
            target,
            valid_stamp: 0,
        }
    }

    /// Grows/shrinks the target to `size` if it differs; any resize drops
    /// the cached content.
    pub fn ensure_size(&mut self, size: Size) -> Result<()> {
        if self.target.size() != size {
            self.target.resize(size)?;
            self.valid_stamp = 0;
        }
        Ok(())
    }
}

impl std::fmt::Debug for CachingSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingSurface")
            .field("size", &self.target.size())
            .field("valid_stamp", &self.valid_stamp)
            .finish()
    }
}
