//! Image resizing: pure Rust, no system dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Resize** | Lanczos3, exact target dimensions |
//! | **Encode** | same container format as the source |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math and size estimates (unit testable)
//! - **Parameters**: Data structures describing resize policy and operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{estimate_size, resolve_dimensions};
pub use operations::{OutputTarget, ResizePreview, get_dimensions, preview_resize, resize_file};
pub use params::{RatioKind, ResizeMode, ResizeParams, ResizePlan};
pub use rust_backend::RustBackend;
