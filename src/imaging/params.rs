//! Parameter types for resize operations.
//!
//! These structs describe *what* to do, not *how* to do it. [`ResizePlan`] is
//! the operator-facing policy attached to a file; [`ResizeParams`] is the
//! fully resolved instruction handed to a [`backend`](super::backend).
//!
//! ## Types
//!
//! - [`ResizeMode`]: scale by ratio, or pin both dimensions.
//! - [`RatioKind`]: how ratio mode picks its scale factor.
//! - [`ResizePlan`]: the per-file policy record; every field is kept so that
//!   switching modes in an editor does not lose the other mode's values.
//! - [`ResizeParams`]: source, output path, target dimensions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    #[default]
    Ratio,
    FixedDimensions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioKind {
    #[default]
    Percent,
    FixedWidth,
    FixedHeight,
}

/// Resize policy for one file.
///
/// `ratio_kind` and `ratio_value` apply in [`ResizeMode::Ratio`];
/// `fixed_width`/`fixed_height` apply in [`ResizeMode::FixedDimensions`],
/// where the original aspect ratio is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizePlan {
    pub mode: ResizeMode,
    pub ratio_kind: RatioKind,
    /// Percentage for `Percent`, pixel size of the pinned edge otherwise.
    pub ratio_value: f64,
    pub fixed_width: u32,
    pub fixed_height: u32,
}

impl Default for ResizePlan {
    fn default() -> Self {
        Self {
            mode: ResizeMode::Ratio,
            ratio_kind: RatioKind::Percent,
            ratio_value: 50.0,
            fixed_width: 1024,
            fixed_height: 1024,
        }
    }
}

impl ResizePlan {
    /// Scale both edges by `percent`.
    pub fn percent(percent: f64) -> Self {
        Self {
            mode: ResizeMode::Ratio,
            ratio_kind: RatioKind::Percent,
            ratio_value: percent,
            ..Self::default()
        }
    }

    /// Pin the width, deriving the height from the aspect ratio.
    pub fn fixed_width(width: u32) -> Self {
        Self {
            mode: ResizeMode::Ratio,
            ratio_kind: RatioKind::FixedWidth,
            ratio_value: width as f64,
            ..Self::default()
        }
    }

    /// Pin the height, deriving the width from the aspect ratio.
    pub fn fixed_height(height: u32) -> Self {
        Self {
            mode: ResizeMode::Ratio,
            ratio_kind: RatioKind::FixedHeight,
            ratio_value: height as f64,
            ..Self::default()
        }
    }

    /// Set both edges explicitly.
    pub fn fixed_dimensions(width: u32, height: u32) -> Self {
        Self {
            mode: ResizeMode::FixedDimensions,
            fixed_width: width,
            fixed_height: height,
            ..Self::default()
        }
    }
}

/// Parameters for a single resize: exact output dimensions, aspect ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
}
