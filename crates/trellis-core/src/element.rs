//! Element: a node in the composition tree with a resolvable rectangle.
//!
//! Configuration is split into one record per concern (layout, input, render)
//! so the invariants each subsystem relies on stay auditable. Mutation goes
//! through [`UiContext`](crate::UiContext) methods, which own the
//! invalidation and notification fan-out; the element struct itself only
//! stores state and caches.

use bitflags::bitflags;
use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::geometry::{Insets, Rect, Vec2};
use crate::units::{AspectMode, UnitRect, UnitSize};

new_key_type! {
    /// Generational handle into the element arena. Doubles as a weak
    /// back-reference: a handle to a destroyed element simply fails lookup.
    pub struct ElementId;
}

pub(crate) type ChildList = SmallVec<[ElementId; 8]>;

bitflags! {
    /// Mask deciding which draw passes an element participates in.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct DrawModeMask: u32 {
        /// Regular window content.
        const MAIN = 1;
        /// Cursor-attached geometry drawn after everything else.
        const CURSOR = 1 << 1;
        /// Transient overlays (tooltips, drag previews).
        const OVERLAY = 1 << 2;
    }
}

impl Default for DrawModeMask {
    fn default() -> Self {
        DrawModeMask::MAIN
    }
}

/// Layout-facing configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Whether this element's rendering and hit rect are clipped to the
    /// parent's inner rect.
    pub clipped_by_parent: bool,
    /// Whether recursive destruction of the parent destroys this element too
    /// (cleared: the element is detached instead and stays alive).
    pub destroyed_by_parent: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            clipped_by_parent: true,
            destroyed_by_parent: true,
        }
    }
}

/// Input-facing configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputConfig {
    pub enabled: bool,
    /// Cursor events pass through to whatever is behind this element.
    pub cursor_pass_through: bool,
    /// Unhandled cursor events are re-offered to the parent chain.
    pub propagate_to_parent: bool,
    /// On capture, remember the previous holder and restore it silently on
    /// release (single level; see `UiContext::capture`).
    pub restore_old_capture: bool,
    /// While holding capture, re-distribute events into the own subtree via
    /// the ordinary hit descent.
    pub distributes_captured: bool,
    /// Held cursor presses generate repeated press events.
    pub auto_repeat: bool,
    /// Seconds before the first auto-repeat event.
    pub repeat_delay: f32,
    /// Seconds between subsequent auto-repeat events.
    pub repeat_rate: f32,
    /// Eligible as a drag-and-drop target.
    pub drag_drop_target: bool,
    /// A rejected drop keeps the drag session alive instead of ending it.
    pub sticky_drag: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            enabled: true,
            cursor_pass_through: false,
            propagate_to_parent: false,
            restore_old_capture: false,
            distributes_captured: false,
            auto_repeat: false,
            repeat_delay: 0.3,
            repeat_rate: 0.06,
            drag_drop_target: true,
            sticky_drag: false,
        }
    }
}

/// Render-facing configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderConfig {
    pub visible: bool,
    /// Drawn in the on-top band, strictly in front of normal siblings.
    pub always_on_top: bool,
    /// When cleared, all z-order move requests are silent no-ops.
    pub z_order_enabled: bool,
    /// A press on this element moves its chain to the front of each band.
    pub rise_on_click: bool,
    /// Render once into a private offscreen target and composite the cached
    /// image until invalidated.
    pub auto_surface: bool,
    pub draw_mode: DrawModeMask,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            visible: true,
            always_on_top: false,
            z_order_enabled: true,
            rise_on_click: true,
            auto_surface: false,
            draw_mode: DrawModeMask::MAIN,
        }
    }
}

/// Lazily revalidated clip rectangles (screen space).
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ClipCache {
    pub outer: Rect,
    pub inner: Rect,
    pub hit: Rect,
    pub outer_valid: bool,
    pub inner_valid: bool,
    pub hit_valid: bool,
}

impl ClipCache {
    pub fn invalidate(&mut self) {
        self.outer_valid = false;
        self.inner_valid = false;
        self.hit_valid = false;
    }
}

pub struct Element {
    pub(crate) name: String,
    pub(crate) text: String,
    pub(crate) look: Option<String>,

    pub(crate) parent: Option<ElementId>,
    /// Logical order (insertion order), independent of draw order.
    pub(crate) children: ChildList,
    /// Z order: last entry draws topmost. Partitioned into a normal band
    /// followed by an always-on-top band.
    pub(crate) draw_list: ChildList,

    pub(crate) area: UnitRect,
    pub(crate) min_size: UnitSize,
    pub(crate) max_size: UnitSize,
    pub(crate) aspect_mode: AspectMode,
    pub(crate) aspect_ratio: f32,
    pub(crate) rotation: f32,
    pub(crate) pivot: Vec2,
    pub(crate) insets: Insets,

    pub(crate) layout: LayoutConfig,
    pub(crate) input: InputConfig,
    pub(crate) render: RenderConfig,

    /// Resolved screen-space rect; kept in sync eagerly on area changes.
    pub(crate) pixel_rect: Rect,
    pub(crate) clip: ClipCache,
    /// Geometry cache dirty flag, consumed by the render layer.
    pub(crate) needs_redraw: bool,
    /// Monotonic counter bumped on invalidation; caching surfaces compare
    /// against it to decide re-rasterization.
    pub(crate) stamp: u64,
}

impl Element {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            text: String::new(),
            look: None,
            parent: None,
            children: ChildList::new(),
            draw_list: ChildList::new(),
            area: UnitRect::default(),
            min_size: UnitSize::ZERO,
            max_size: UnitSize::ZERO,
            aspect_mode: AspectMode::Ignore,
            aspect_ratio: 1.0,
            rotation: 0.0,
            pivot: Vec2::ZERO,
            insets: Insets::ZERO,
            layout: LayoutConfig::default(),
            input: InputConfig::default(),
            render: RenderConfig::default(),
            pixel_rect: Rect::default(),
            clip: ClipCache::default(),
            needs_redraw: true,
            stamp: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn look(&self) -> Option<&str> {
        self.look.as_deref()
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Children in draw order (last = topmost).
    pub fn draw_list(&self) -> &[ElementId] {
        &self.draw_list
    }

    pub fn area(&self) -> UnitRect {
        self.area
    }

    /// Resolved screen-space rectangle (unclipped).
    pub fn pixel_rect(&self) -> Rect {
        self.pixel_rect
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn pivot(&self) -> Vec2 {
        self.pivot
    }

    pub fn insets(&self) -> Insets {
        self.insets
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn input(&self) -> &InputConfig {
        &self.input
    }

    pub fn render(&self) -> &RenderConfig {
        &self.render
    }

    pub fn is_visible(&self) -> bool {
        self.render.visible
    }

    pub fn is_enabled(&self) -> bool {
        self.input.enabled
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Invalidation stamp, monotonic per context.
    pub fn stamp(&self) -> u64 {
        self.stamp
    }
}
