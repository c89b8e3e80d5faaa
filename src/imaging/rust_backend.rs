//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only) |
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, WebP) | `image::ImageReader` with format guessing |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode | same container as the source, via `ImageFormat::from_path` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::ResizeParams;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk, sniffing the content when the
/// extension lies.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    let decode_err = |e: image::ImageError| BackendError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(decode_err)
}

/// Encode `img` into `path` using the container format of `format_source`.
///
/// JPEG has no alpha channel, so RGBA input is flattened to RGB first.
fn save_image(img: &DynamicImage, path: &Path, format_source: &Path) -> Result<(), BackendError> {
    let format = ImageFormat::from_path(format_source)
        .map_err(|_| BackendError::UnsupportedFormat(format_source.to_path_buf()))?;

    let to_write = match format {
        ImageFormat::Jpeg if img.color().has_alpha() => {
            DynamicImage::ImageRgb8(img.to_rgb8())
        }
        _ => img.clone(),
    };

    write_replacing(path, |writer| {
        to_write.write_to(writer, format).map_err(|e| e.to_string())
    })
}

/// Write `path` through a temporary sibling that is renamed over it only
/// once `encode` succeeds. An existing file keeps its permissions.
fn write_replacing<F>(path: &Path, encode: F) -> Result<(), BackendError>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<(), String>,
{
    let write_err = |message: String| BackendError::Write {
        path: path.to_path_buf(),
        message,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = tempfile::Builder::new()
        .prefix(".texture-sweep-")
        .tempfile_in(dir)?;
    if let Ok(existing) = fs::metadata(path) {
        staged.as_file().set_permissions(existing.permissions())?;
    }
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        encode(&mut writer).map_err(write_err)?;
        writer.flush()?;
    }
    staged
        .persist(path)
        .map_err(|e| write_err(e.error.to_string()))?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| BackendError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        if params.width == 0 || params.height == 0 {
            return Err(BackendError::ZeroDimension {
                width: params.width,
                height: params.height,
            });
        }
        let img = load_image(&params.source)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        save_image(&resized, &params.output, &params.source)
    }
}
