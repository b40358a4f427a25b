//! Unit dimensions: mixed relative + absolute coordinates resolved against a
//! parent extent. `resolve` is pure; higher layers cache results and only
//! recompute when an input actually changed.

use crate::geometry::{Size, Vec2};

/// A (relative fraction, absolute offset) pair: `scale * extent + offset`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UnitValue {
    pub scale: f32,
    pub offset: f32,
}

impl UnitValue {
    pub const ZERO: UnitValue = UnitValue {
        scale: 0.0,
        offset: 0.0,
    };

    pub fn new(scale: f32, offset: f32) -> Self {
        UnitValue { scale, offset }
    }

    /// Purely absolute value in pixels.
    pub fn px(offset: f32) -> Self {
        UnitValue { scale: 0.0, offset }
    }

    /// Purely relative fraction of the parent extent.
    pub fn rel(scale: f32) -> Self {
        UnitValue { scale, offset: 0.0 }
    }

    pub fn resolve(&self, extent: f32) -> f32 {
        self.scale * extent + self.offset
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UnitPoint {
    pub x: UnitValue,
    pub y: UnitValue,
}

impl UnitPoint {
    pub const ZERO: UnitPoint = UnitPoint {
        x: UnitValue::ZERO,
        y: UnitValue::ZERO,
    };

    pub fn new(x: UnitValue, y: UnitValue) -> Self {
        UnitPoint { x, y }
    }

    pub fn px(x: f32, y: f32) -> Self {
        UnitPoint {
            x: UnitValue::px(x),
            y: UnitValue::px(y),
        }
    }

    pub fn resolve(&self, parent: Size) -> Vec2 {
        Vec2 {
            x: self.x.resolve(parent.width),
            y: self.y.resolve(parent.height),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UnitSize {
    pub width: UnitValue,
    pub height: UnitValue,
}

impl UnitSize {
    pub const ZERO: UnitSize = UnitSize {
        width: UnitValue::ZERO,
        height: UnitValue::ZERO,
    };

    pub fn new(width: UnitValue, height: UnitValue) -> Self {
        UnitSize { width, height }
    }

    pub fn px(w: f32, h: f32) -> Self {
        UnitSize {
            width: UnitValue::px(w),
            height: UnitValue::px(h),
        }
    }

    pub fn rel(w: f32, h: f32) -> Self {
        UnitSize {
            width: UnitValue::rel(w),
            height: UnitValue::rel(h),
        }
    }

    pub fn resolve(&self, parent: Size) -> Size {
        Size {
            width: self.width.resolve(parent.width),
            height: self.height.resolve(parent.height),
        }
    }
}

/// Position + size expressed in unit dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UnitRect {
    pub pos: UnitPoint,
    pub size: UnitSize,
}

impl UnitRect {
    pub fn new(pos: UnitPoint, size: UnitSize) -> Self {
        UnitRect { pos, size }
    }
}

/// How a resolved size is clamped to a fixed width/height ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AspectMode {
    /// No aspect locking.
    #[default]
    Ignore,
    /// Shrink the axis that violates the ratio.
    Shrink,
    /// Expand the axis that falls short of the ratio.
    Expand,
    /// Height follows width.
    AlwaysFromWidth,
    /// Width follows height.
    AlwaysFromHeight,
}

/// Applies an aspect lock to a resolved size. `ratio` is width / height.
pub fn apply_aspect(size: Size, mode: AspectMode, ratio: f32) -> Size {
    if ratio <= 0.0 {
        return size;
    }
    match mode {
        AspectMode::Ignore => size,
        AspectMode::AlwaysFromWidth => Size {
            width: size.width,
            height: size.width / ratio,
        },
        AspectMode::AlwaysFromHeight => Size {
            width: size.height * ratio,
            height: size.height,
        },
        AspectMode::Shrink => {
            let expected_w = size.height * ratio;
            if size.width > expected_w {
                Size {
                    width: expected_w,
                    height: size.height,
                }
            } else {
                Size {
                    width: size.width,
                    height: size.width / ratio,
                }
            }
        }
        AspectMode::Expand => {
            let expected_w = size.height * ratio;
            if size.width < expected_w {
                Size {
                    width: expected_w,
                    height: size.height,
                }
            } else {
                Size {
                    width: size.width,
                    height: size.width / ratio,
                }
            }
        }
    }
}

/// Clamps a resolved size to resolved min/max constraints. A max component of
/// zero (or less) means unbounded on that axis. Output is never negative.
pub fn clamp_size(size: Size, min: Size, max: Size) -> Size {
    let mut w = size.width.max(min.width);
    let mut h = size.height.max(min.height);
    if max.width > 0.0 {
        w = w.min(max.width);
    }
    if max.height > 0.0 {
        h = h.min(max.height);
    }
    Size {
        width: w.max(0.0),
        height: h.max(0.0),
    }
}
