//! Pure geometry engine for box move and resize under container constraints.

use crate::handles::HandleKind;
use kurbo::{Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Tolerance for geometric equality checks.
pub const GEOMETRY_EPS: f64 = 0.001;

/// Clamp a value between two bounds given in either order.
///
/// Returns the median of its arguments, so `bound(lo, hi, v)` and
/// `bound(hi, lo, v)` agree.
pub fn bound(a: f64, b: f64, c: f64) -> f64 {
    let mut values = [a, b, c];
    values.sort_by(f64::total_cmp);
    values[1]
}

/// Box-model styling of a positioned node: offsets from the parent's
/// origin plus an explicit size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl BoxRect {
    /// Create a new box rect.
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// The box as a rect whose origin is shifted by `offset`.
    pub fn to_rect(&self, offset: Vec2) -> Rect {
        Rect::new(
            self.left + offset.x,
            self.top + offset.y,
            self.left + offset.x + self.width,
            self.top + offset.y + self.height,
        )
    }

    /// Field-wise equality within `eps`.
    pub fn approx_eq(&self, other: &BoxRect, eps: f64) -> bool {
        (self.top - other.top).abs() <= eps
            && (self.left - other.left).abs() <= eps
            && (self.width - other.width).abs() <= eps
            && (self.height - other.height).abs() <= eps
    }
}

/// Minimum and maximum box size, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeLimits {
    pub min: Size,
    pub max: Size,
}

/// Frame geometry and constraints for one gesture.
#[derive(Debug, Clone, Copy)]
pub struct ResizeContext {
    /// Size of the bounding container.
    pub container: Size,
    /// Offset of the box's parent origin from the container origin.
    pub offset: Vec2,
    /// Size limits per axis.
    pub limits: SizeLimits,
    /// Width/height ratio to maintain, if locked.
    pub aspect: Option<f64>,
    /// Skip the container-edge pre-clamp of the dragged edge.
    pub invert_on_edge: bool,
}

/// Resolve a pointer displacement into new box styling.
///
/// `handle` is the active handle; `None` drags the whole box. Returns
/// `None` for a zero displacement, which callers treat as a no-op.
pub fn resolve_rect(
    initial: &BoxRect,
    handle: Option<HandleKind>,
    delta: Vec2,
    ctx: &ResizeContext,
) -> Option<BoxRect> {
    if delta.x == 0.0 && delta.y == 0.0 {
        return None;
    }

    let mut dx = delta.x;
    let mut dy = delta.y;

    // Keep the dragged edge inside the container unless inversion is on.
    if !ctx.invert_on_edge {
        if let Some(handle) = handle {
            if handle.has_top() {
                dy = dy.max(-(initial.top + ctx.offset.y));
            }
            if handle.has_bottom() {
                dy = dy.min(ctx.container.height - ctx.offset.y - initial.top - initial.height);
            }
            if handle.has_left() {
                dx = dx.max(-(initial.left + ctx.offset.x));
            }
            if handle.has_right() {
                dx = dx.min(ctx.container.width - ctx.offset.x - initial.left - initial.width);
            }
        }
    }

    let mut top = initial.top;
    let mut left = initial.left;
    let mut width = initial.width;
    let mut height = initial.height;

    match handle {
        None => {
            top += dy;
            left += dx;
        }
        Some(handle) => {
            if handle.has_top() {
                top += dy;
                height -= dy;
            } else if handle.has_bottom() {
                height += dy;
            }
            if handle.has_left() {
                left += dx;
                width -= dx;
            } else if handle.has_right() {
                width += dx;
            }
        }
    }

    // With a locked ratio the dragged axis drives the other one;
    // horizontal wins on corner handles.
    if let (Some(ratio), Some(handle)) = (ctx.aspect, handle) {
        if handle.has_left() || handle.has_right() {
            height = width / ratio;
        } else {
            width = height * ratio;
        }
    }

    let clamped_w = bound(ctx.limits.min.width, ctx.limits.max.width, width);
    let clamped_h = bound(ctx.limits.min.height, ctx.limits.max.height, height);
    let (width, height) = match (ctx.aspect, handle) {
        (Some(ratio), Some(_)) => reconcile_aspect(clamped_w, clamped_h, ratio, &ctx.limits),
        _ => (clamped_w, clamped_h),
    };

    // Clamping must never move the edge opposite the dragged one.
    if let Some(handle) = handle {
        if handle.has_top() {
            top = initial.top + initial.height - height;
        }
        if handle.has_left() {
            left = initial.left + initial.width - width;
        }
    }

    let top = bound(-ctx.offset.y, ctx.container.height - ctx.offset.y - height, top);
    let left = bound(-ctx.offset.x, ctx.container.width - ctx.offset.x - width, left);

    Some(BoxRect {
        top,
        left,
        width,
        height,
    })
}

/// Restore the locked ratio after independent clamping, treating the
/// more tightly clamped axis as authoritative.
fn reconcile_aspect(width: f64, height: f64, ratio: f64, limits: &SizeLimits) -> (f64, f64) {
    let (mut width, mut height) = if width + GEOMETRY_EPS < height * ratio {
        (width, width / ratio)
    } else {
        (height * ratio, height)
    };
    width = bound(limits.min.width, limits.max.width, width);
    height = bound(limits.min.height, limits.max.height, height);

    // Re-clamping can break the ratio again; the smaller dimension wins.
    if (width - height * ratio).abs() > GEOMETRY_EPS {
        if width < height * ratio {
            height = bound(limits.min.height, limits.max.height, width / ratio);
        } else {
            width = bound(limits.min.width, limits.max.width, height * ratio);
        }
    }
    (width, height)
}
