//! Pure calculation functions for resize dimensions and size estimates.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{RatioKind, ResizeMode, ResizePlan};

/// Resolve the output dimensions a plan produces for an image.
///
/// All derived edges are floored. A pinned edge on a zero-sized original
/// yields `0` for the derived edge rather than dividing by zero.
///
/// # Examples
/// ```
/// # use texture_sweep::imaging::{ResizePlan, resolve_dimensions};
/// assert_eq!(resolve_dimensions((1000, 500), &ResizePlan::percent(50.0)), (500, 250));
/// assert_eq!(resolve_dimensions((2000, 1000), &ResizePlan::fixed_width(400)), (400, 200));
/// ```
pub fn resolve_dimensions(original: (u32, u32), plan: &ResizePlan) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    let (w, h) = (orig_w as f64, orig_h as f64);
    let v = plan.ratio_value;

    match plan.mode {
        ResizeMode::FixedDimensions => (plan.fixed_width, plan.fixed_height),
        ResizeMode::Ratio => match plan.ratio_kind {
            RatioKind::Percent => (floor(w * v / 100.0), floor(h * v / 100.0)),
            RatioKind::FixedWidth => {
                let new_h = if orig_w > 0 { floor(h * v / w) } else { 0 };
                (floor(v), new_h)
            }
            RatioKind::FixedHeight => {
                let new_w = if orig_h > 0 { floor(w * v / h) } else { 0 };
                (new_w, floor(v))
            }
        },
    }
}

/// Estimate the encoded size after resizing, assuming bytes scale linearly
/// with pixel count.
///
/// Returns `original_size` unchanged when the original area is zero.
pub fn estimate_size(original_size: u64, original: (u32, u32), target: (u32, u32)) -> u64 {
    let orig_area = original.0 as u128 * original.1 as u128;
    if orig_area == 0 {
        return original_size;
    }
    let target_area = target.0 as u128 * target.1 as u128;
    let estimate = original_size as u128 * target_area / orig_area;
    u64::try_from(estimate).unwrap_or(u64::MAX)
}

// Saturating: negative values clamp to 0, overflow to u32::MAX.
fn floor(value: f64) -> u32 {
    value.floor() as u32
}
