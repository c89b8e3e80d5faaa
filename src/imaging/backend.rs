//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the resize planner
//! needs: `identify` (header-only dimensions, cheap enough for previews) and
//! `resize` (decode, resample, re-encode).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use the recording
//! `MockBackend` below.

use super::params::ResizeParams;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },
    #[error("cannot write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },
    #[error("target dimensions {width}x{height} contain a zero edge")]
    ZeroDimension { width: u32, height: u32 },
    #[error("unsupported image format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Send + Sync` so a backend can be moved onto the resize worker thread.
pub trait ImageBackend: Send + Sync {
    /// Get image dimensions from the file header, without decoding pixels.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Resize to exactly `width`x`height` and write in the source's format.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}

impl<B: ImageBackend + ?Sized> ImageBackend for std::sync::Arc<B> {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        (**self).identify(path)
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        (**self).resize(params)
    }
}
