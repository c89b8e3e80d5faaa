//! Folder inventory: the image files physically present under a root folder.
//!
//! A scan walks the root recursively and records every regular file whose
//! extension is one of [`IMAGE_EXTENSIONS`](crate::extract::IMAGE_EXTENSIONS).
//! The whole inventory is replaced on each scan; there is no partial update.
//!
//! ```text
//! assets/                        # scanned root
//! ├── scene.babylon              # ignored (not an image)
//! ├── hero.png                   # InventoryFile { name: "hero.png", .. }
//! └── ui/
//!     ├── Coin.PNG               # names keep their original case
//!     └── .thumbs/cache.bin      # ignored
//! ```
//!
//! ## File operations
//!
//! [`FolderInventory::delete`] and [`FolderInventory::move_to`] act on disk
//! and drop the entries whose path they acted on. Neither is transactional: a
//! batch that fails halfway leaves the earlier files deleted or moved, and
//! the per-path failures are listed in the returned [`BatchOutcome`].

use crate::extract::has_image_extension;
use crate::types::BatchOutcome;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("no folder selected")]
    NoRoot,
    #[error("folder not found: {}", .0.display())]
    RootMissing(PathBuf),
    #[error("not a folder: {}", .0.display())]
    NotADirectory(PathBuf),
}

#[derive(Error, Debug)]
pub enum FileOpError {
    #[error("delete failed: {0}")]
    Delete(#[source] io::Error),
    #[error("move failed: {0}")]
    Move(#[source] io::Error),
    #[error("destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),
    #[error("path has no file name")]
    InvalidName,
}

/// An image file found on disk during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryFile {
    /// Full path; unique within one scan.
    pub path: PathBuf,
    /// Basename in its original case.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Directory containing the file.
    pub source_folder: PathBuf,
}

impl InventoryFile {
    /// The case-folded name used for matching against references.
    pub fn reference_key(&self) -> String {
        self.name.to_lowercase()
    }
}

#[derive(Debug, Default)]
pub struct FolderInventory {
    root: Option<PathBuf>,
    files: Vec<InventoryFile>,
}

impl FolderInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `root` and replace the inventory with a fresh scan of it.
    ///
    /// If the root is missing or is not a directory the inventory is emptied
    /// and the error is returned once.
    pub fn scan(&mut self, root: &Path) -> Result<&[InventoryFile], ScanError> {
        self.root = Some(root.to_path_buf());
        self.files.clear();
        self.files = scan_images(root)?;
        info!(root = %root.display(), files = self.files.len(), "scanned folder");
        Ok(&self.files)
    }

    /// Scan the remembered root again.
    ///
    /// Unlike [`scan`](Self::scan), a missing root leaves the current
    /// inventory untouched.
    pub fn rescan(&mut self) -> Result<&[InventoryFile], ScanError> {
        let root = self.root.clone().ok_or(ScanError::NoRoot)?;
        if !root.exists() {
            return Err(ScanError::RootMissing(root));
        }
        self.scan(&root)
    }

    /// Permanently delete each path. Successful deletions drop exactly the
    /// inventory entry with that path.
    pub fn delete<P: AsRef<Path>>(&mut self, paths: &[P]) -> BatchOutcome<FileOpError> {
        let mut outcome = BatchOutcome::new();
        for path in paths {
            let path = path.as_ref();
            match fs::remove_file(path) {
                Ok(()) => {
                    debug!(path = %path.display(), "deleted");
                    self.forget(path);
                    outcome.success(path.to_path_buf());
                }
                Err(err) => outcome.failure(path.to_path_buf(), FileOpError::Delete(err)),
            }
        }
        outcome
    }

    /// Move each path into `destination`, keeping its basename.
    ///
    /// An existing file at the target is reported as a collision rather than
    /// overwritten.
    pub fn move_to<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        destination: &Path,
    ) -> BatchOutcome<FileOpError> {
        let mut outcome = BatchOutcome::new();
        for path in paths {
            let path = path.as_ref();
            match move_file(path, destination) {
                Ok(target) => {
                    debug!(from = %path.display(), to = %target.display(), "moved");
                    self.forget(path);
                    outcome.success(path.to_path_buf());
                }
                Err(err) => outcome.failure(path.to_path_buf(), err),
            }
        }
        outcome
    }

    pub fn files(&self) -> &[InventoryFile] {
        &self.files
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    fn forget(&mut self, path: &Path) {
        self.files.retain(|f| f.path != path);
    }
}

/// Walk `root` and collect every recognized image file.
///
/// Entries the walker cannot read and files whose metadata cannot be read
/// are skipped without being reported.
pub fn scan_images(root: &Path) -> Result<Vec<InventoryFile>, ScanError> {
    if !root.exists() {
        return Err(ScanError::RootMissing(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let candidates: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!("skipping unreadable entry: {err}");
                None
            }
        })
        .filter(is_regular_file)
        .filter(|entry| has_image_extension(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.into_path())
        .collect();

    // par_iter + collect keeps the walk order
    let files = candidates
        .par_iter()
        .filter_map(|path| {
            let size = fs::metadata(path).ok()?.len();
            let name = path.file_name()?.to_string_lossy().into_owned();
            let source_folder = path.parent().map(Path::to_path_buf).unwrap_or_default();
            Some(InventoryFile {
                path: path.clone(),
                name,
                size,
                source_folder,
            })
        })
        .collect();

    Ok(files)
}

/// A regular file, or a symlink that resolves to one. Directory links are
/// not followed by the walk itself.
pub(crate) fn is_regular_file(entry: &DirEntry) -> bool {
    let kind = entry.file_type();
    kind.is_file() || (kind.is_symlink() && entry.path().is_file())
}

fn move_file(path: &Path, destination: &Path) -> Result<PathBuf, FileOpError> {
    let name = path.file_name().ok_or(FileOpError::InvalidName)?;
    let target = destination.join(name);
    if target.exists() {
        return Err(FileOpError::DestinationExists(target));
    }
    match fs::rename(path, &target) {
        Ok(()) => Ok(target),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(path, &target).map_err(FileOpError::Move)?;
            fs::remove_file(path).map_err(FileOpError::Move)?;
            Ok(target)
        }
        Err(err) => Err(FileOpError::Move(err)),
    }
}
