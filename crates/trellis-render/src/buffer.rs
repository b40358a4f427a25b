//! Retained geometry buffers.
//!
//! A [`GeometryBuffer`] holds an element's vertices in local space plus the
//! state a backend needs to draw them: a screen translation, an optional
//! rotation hint, a scissor clip and per-batch texture/blend state. Buffers
//! are cached per element and re-submitted each frame; only the translation
//! and clip change on a pure move.

use trellis_core::{Rect, Vec2};

/// Straight (non-premultiplied) linear RGBA.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }
}

/// Backend-assigned texture identity. `0` is reserved for "untextured".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    /// Position local to the owning buffer.
    pub pos: Vec2,
    pub uv: Vec2,
    pub color: Color,
}

/// A run of vertices sharing texture and blend state. Batches split only
/// when that state changes, so a backend can map each batch to one draw
/// call.
#[derive(Clone, Debug)]
pub struct VertexBatch {
    pub texture: Option<TextureHandle>,
    pub blend: BlendMode,
    pub vertices: Vec<Vertex>,
}

#[derive(Default)]
pub struct GeometryBuffer {
    batches: Vec<VertexBatch>,
    texture: Option<TextureHandle>,
    blend: BlendMode,

    /// Screen-space translation applied to every vertex at draw time.
    pub translation: Vec2,
    /// Rotation hint in radians around `pivot` (local space). Zero for the
    /// overwhelming majority of elements.
    pub rotation: f32,
    pub pivot: Vec2,
    /// Screen-space scissor rect; `None` draws unclipped.
    pub clip: Option<Rect>,
}

impl GeometryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards all vertices but keeps translation/clip state.
    pub fn clear(&mut self) {
        self.batches.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.batches.iter().all(|b| b.vertices.is_empty())
    }

    pub fn vertex_count(&self) -> usize {
        self.batches.iter().map(|b| b.vertices.len()).sum()
    }

    pub fn batches(&self) -> &[VertexBatch] {
        &self.batches
    }

    /// Selects the texture for subsequently pushed vertices.
    pub fn set_texture(&mut self, texture: Option<TextureHandle>) {
        self.texture = texture;
    }

    pub fn set_blend(&mut self, blend: BlendMode) {
        self.blend = blend;
    }

    pub fn push_vertices(&mut self, vertices: &[Vertex]) {
        self.active_batch().vertices.extend_from_slice(vertices);
    }

    /// Two-triangle solid quad in local space.
    pub fn push_quad(&mut self, rect: Rect, color: Color) {
        self.push_textured_quad(rect, Rect::new(0.0, 0.0, 1.0, 1.0), color);
    }

    /// Two-triangle quad with explicit texture coordinates.
    pub fn push_textured_quad(&mut self, rect: Rect, uv: Rect, color: Color) {
        let v = |x, y, u, w| Vertex {
            pos: Vec2::new(x, y),
            uv: Vec2::new(u, w),
            color,
        };
        let (r, b) = (rect.right(), rect.bottom());
        let (ur, ub) = (uv.right(), uv.bottom());
        self.push_vertices(&[
            v(rect.x, rect.y, uv.x, uv.y),
            v(r, rect.y, ur, uv.y),
            v(r, b, ur, ub),
            v(rect.x, rect.y, uv.x, uv.y),
            v(r, b, ur, ub),
            v(rect.x, b, uv.x, ub),
        ]);
    }

    fn active_batch(&mut self) -> &mut VertexBatch {
        let compatible = self
            .batches
            .last()
            .is_some_and(|b| b.texture == self.texture && b.blend == self.blend);
        if !compatible {
            self.batches.push(VertexBatch {
                texture: self.texture,
                blend: self.blend,
                vertices: Vec::new(),
            });
        }
        let last = self.batches.len() - 1;
        &mut self.batches[last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quads_sharing_state_share_a_batch() {
        let mut buf = GeometryBuffer::new();
        buf.push_quad(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        buf.push_quad(Rect::new(20.0, 0.0, 10.0, 10.0), Color::WHITE);
        assert_eq!(buf.batches().len(), 1);
        assert_eq!(buf.vertex_count(), 12);
    }

    #[test]
    fn texture_change_opens_a_new_batch() {
        let mut buf = GeometryBuffer::new();
        buf.push_quad(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        buf.set_texture(Some(TextureHandle(7)));
        buf.push_quad(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        assert_eq!(buf.batches().len(), 2);
        assert_eq!(buf.batches()[1].texture, Some(TextureHandle(7)));
    }

    #[test]
    fn clear_keeps_transform_state() {
        let mut buf = GeometryBuffer::new();
        buf.translation = Vec2::new(5.0, 5.0);
        buf.push_quad(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.translation, Vec2::new(5.0, 5.0));
    }
}
