//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They take a
//! plan, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{estimate_size, resolve_dimensions};
use super::params::{ResizeParams, ResizePlan};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Where resized files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Replace the source file.
    Overwrite,
    /// Write `<dir>/<basename>`, leaving the source untouched.
    Folder(PathBuf),
}

impl OutputTarget {
    pub fn output_path(&self, source: &Path) -> PathBuf {
        match self {
            OutputTarget::Overwrite => source.to_path_buf(),
            OutputTarget::Folder(dir) => match source.file_name() {
                Some(name) => dir.join(name),
                None => dir.clone(),
            },
        }
    }
}

/// What a plan would do to one file, computed before anything is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResizePreview {
    pub original: (u32, u32),
    pub target: (u32, u32),
    pub original_size: u64,
    pub estimated_size: u64,
}

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Compute the preview for a file of known dimensions and size.
pub fn preview_resize(original: (u32, u32), original_size: u64, plan: &ResizePlan) -> ResizePreview {
    let target = resolve_dimensions(original, plan);
    ResizePreview {
        original,
        target,
        original_size,
        estimated_size: estimate_size(original_size, original, target),
    }
}

/// Plan a resize operation without executing it.
pub fn plan_resize(
    source: &Path,
    original: (u32, u32),
    plan: &ResizePlan,
    target: &OutputTarget,
) -> ResizeParams {
    let (width, height) = resolve_dimensions(original, plan);
    ResizeParams {
        source: source.to_path_buf(),
        output: target.output_path(source),
        width,
        height,
    }
}

/// Identify, resolve and resize one file.
///
/// Zero target edges are rejected here so no backend ever sees them.
/// Returns the dimensions written.
pub fn resize_file(
    backend: &impl ImageBackend,
    source: &Path,
    plan: &ResizePlan,
    target: &OutputTarget,
) -> Result<(u32, u32)> {
    let original = get_dimensions(backend, source)?;
    let params = plan_resize(source, original, plan, target);
    if params.width == 0 || params.height == 0 {
        return Err(BackendError::ZeroDimension {
            width: params.width,
            height: params.height,
        });
    }
    backend.resize(&params)?;
    Ok((params.width, params.height))
}
