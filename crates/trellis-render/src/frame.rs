//! The frame walk.
//!
//! [`Compositor::render_frame`] traverses the context's roots in draw order
//! (normal band then always-on-top band, later siblings in front), refreshes
//! dirty geometry through the [`GeometryStore`], and submits each element's
//! buffer translated to its resolved screen position and clipped to its
//! outer clip rect.
//!
//! Elements flagged `auto_surface` are rasterized once into an offscreen
//! [`CachingSurface`] and composited from it until an invalidation stamp in
//! their subtree advances. Backends without offscreen targets degrade to
//! direct drawing with a single warning per element.

use slotmap::SecondaryMap;
use trellis_core::{DrawModeMask, ElementId, UiContext, Vec2};

use crate::cache::{GeometryStore, Painter};
use crate::error::{RenderError, Result};
use crate::surface::{CachingSurface, RenderBackend};

#[derive(Default)]
pub struct Compositor {
    store: GeometryStore,
    surfaces: SecondaryMap<ElementId, CachingSurface>,
    /// Elements whose surface creation already failed; retrying every frame
    /// would spam the backend and the log.
    surface_unsupported: SecondaryMap<ElementId, ()>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_painter(&mut self, id: ElementId, painter: Painter) {
        self.store.set_painter(id, painter);
    }

    /// Whether an element currently composites from a caching surface.
    /// False when the flag is off, the surface was never built, or the
    /// backend reported offscreen targets unsupported.
    pub fn is_caching_active(&self, id: ElementId) -> bool {
        self.surfaces.contains_key(id) && !self.surface_unsupported.contains_key(id)
    }

    /// Draws one frame: every root subtree whose draw mode intersects
    /// `mask`, in draw order.
    pub fn render_frame(
        &mut self,
        ui: &mut UiContext,
        backend: &mut dyn RenderBackend,
        mask: DrawModeMask,
    ) -> Result<()> {
        backend.begin_frame(ui.viewport());
        for root in ui.roots().to_vec() {
            self.draw_element(ui, backend, root, mask)?;
        }
        backend.end_frame();
        self.store.sweep(ui);
        self.surfaces.retain(|id, _| ui.is_alive(id));
        self.surface_unsupported.retain(|id, _| ui.is_alive(id));
        Ok(())
    }

    fn draw_element(
        &mut self,
        ui: &mut UiContext,
        backend: &mut dyn RenderBackend,
        id: ElementId,
        mask: DrawModeMask,
    ) -> Result<()> {
        let Some(el) = ui.element(id) else {
            return Ok(());
        };
        if !el.is_visible() {
            return Ok(());
        }
        if el.render().auto_surface && !self.surface_unsupported.contains_key(id) {
            match self.draw_through_surface(ui, backend, id, mask) {
                Ok(()) => return Ok(()),
                Err(RenderError::NotSupported(why)) => {
                    let name = ui.element(id).map(|e| e.name().to_owned()).unwrap_or_default();
                    log::warn!("caching surface unavailable for '{name}': {why}; drawing direct");
                    self.surface_unsupported.insert(id, ());
                }
                Err(e) => return Err(e),
            }
        }
        self.draw_direct(ui, backend, id, mask, None)
    }

    /// Draws an element and its subtree straight into the current sink.
    /// `offset` is the surface origin while rasterizing into a target (in
    /// which case nested surfaces are flattened into the parent's cache);
    /// `None` means screen space.
    fn draw_direct(
        &mut self,
        ui: &mut UiContext,
        backend: &mut dyn RenderBackend,
        id: ElementId,
        mask: DrawModeMask,
        offset: Option<Vec2>,
    ) -> Result<()> {
        let Some(el) = ui.element(id) else {
            return Ok(());
        };
        if !el.is_visible() {
            return Ok(());
        }
        let off = offset.unwrap_or(Vec2::ZERO);
        if el.render().draw_mode.intersects(mask) {
            let origin = el.pixel_rect().origin();
            let rotation = el.rotation();
            let pivot = el.pivot();
            let clip = ui.outer_clip(id).translated(Vec2::new(-off.x, -off.y));
            // A zero-area clip would scissor everything away anyway.
            if !clip.is_empty() {
                if let Some(buf) = self.store.refresh(ui, id) {
                    buf.translation = Vec2::new(origin.x - off.x, origin.y - off.y);
                    buf.rotation = rotation;
                    buf.pivot = pivot;
                    buf.clip = Some(clip);
                    if !buf.is_empty() {
                        backend.submit(buf);
                    }
                }
            }
        }
        let kids = match ui.element(id) {
            Some(el) => el.draw_list().to_vec(),
            None => return Ok(()),
        };
        for c in kids {
            match offset {
                None => self.draw_element(ui, backend, c, mask)?,
                Some(_) => self.draw_direct(ui, backend, c, mask, offset)?,
            }
        }
        Ok(())
    }

    /// Rasterizes the subtree into the element's caching surface when its
    /// content is out of date, then composites the surface.
    fn draw_through_surface(
        &mut self,
        ui: &mut UiContext,
        backend: &mut dyn RenderBackend,
        id: ElementId,
        mask: DrawModeMask,
    ) -> Result<()> {
        let rect = match ui.element(id) {
            Some(el) => el.pixel_rect(),
            None => return Ok(()),
        };
        if !self.surfaces.contains_key(id) {
            let target = backend.create_target(rect.size())?;
            self.surfaces.insert(id, CachingSurface::new(target));
        }
        if let Some(s) = self.surfaces.get_mut(id) {
            s.ensure_size(rect.size())?;
        }
        let newest = subtree_stamp(ui, id);
        let stale = self
            .surfaces
            .get(id)
            .is_some_and(|s| s.valid_stamp != newest);
        if stale {
            // The surface leaves the map while its target is bound so the
            // subtree walk can borrow the store mutably.
            if let Some(mut surface) = self.surfaces.remove(id) {
                backend.bind_target(surface.target.as_ref());
                let res = self.draw_direct(ui, backend, id, mask, Some(rect.origin()));
                backend.unbind_target();
                surface.valid_stamp = newest;
                self.surfaces.insert(id, surface);
                res?;
            }
        }
        let clip = ui.outer_clip(id);
        if let Some(s) = self.surfaces.get(id) {
            backend.blit_target(s.target.as_ref(), rect, Some(clip));
        }
        Ok(())
    }
}

/// Newest invalidation stamp in a subtree; drives surface re-rasterization.
fn subtree_stamp(ui: &UiContext, id: ElementId) -> u64 {
    let Some(el) = ui.element(id) else {
        return 0;
    };
    let mut newest = el.stamp();
    for &c in el.children() {
        newest = newest.max(subtree_stamp(ui, c));
    }
    newest
}
