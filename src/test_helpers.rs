//! Shared test utilities for the texture-sweep test suite.
//!
//! Provides file fixtures and synthetic images. The standard asset tree:
//!
//! ```text
//! <tmp>/
//! ├── armor.png
//! ├── hero.png
//! ├── scene.babylon        # not an image, never inventoried
//! └── ui/
//!     ├── .thumbs/cache.bin
//!     ├── Coin.PNG
//!     └── shield.jpg
//! ```

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Fixture setup
// =========================================================================

/// Write `content` to `dir/relative`, creating parent directories. Returns
/// the full path.
pub fn write_file(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Build the standard asset tree in a fresh temp directory.
pub fn asset_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_file(tmp.path(), "armor.png", "armor-bytes");
    write_file(tmp.path(), "hero.png", "hero");
    write_file(tmp.path(), "scene.babylon", r#"{"textures": ["hero.png"]}"#);
    write_file(tmp.path(), "ui/.thumbs/cache.bin", "cache");
    write_file(tmp.path(), "ui/Coin.PNG", "coin");
    write_file(tmp.path(), "ui/shield.jpg", "shield-bytes");
    tmp
}

// =========================================================================
// Synthetic images
// =========================================================================

/// Write a real RGBA PNG with a gradient so resampling has something to do.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    img.save(path).unwrap();
}

/// Write a real baseline JPEG.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, 64, (y % 256) as u8]));
    img.save(path).unwrap();
}
