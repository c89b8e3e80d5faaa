//! Operator session: the command surface over registry and inventory.
//!
//! Every operator action is a method returning its outcome value. After any
//! command that changes sources or files the reconciliation statistics are
//! recomputed, so [`Session::stats`] always describes the current state.
//!
//! ```text
//! import_sources ─┐
//! reload_sources ─┤
//! select_folder  ─┤                   ┌─ stats()
//! rescan_folder  ─┼─► refresh stats ──┼─ reconciliation()
//! delete_*       ─┤                   └─ missing_references()
//! move_*         ─┘
//! ```

use crate::config::SourcesConfig;
use crate::inventory::{FileOpError, FolderInventory, ScanError, is_regular_file};
use crate::reconcile::{ReconcileStats, Reconciliation, missing_references, reconcile};
use crate::sources::{SourceError, SourceRegistry};
use crate::types::BatchOutcome;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Why a destructive sweep was not started.
#[derive(Error, Debug)]
pub enum SweepRefused {
    #[error("refusing to touch files: {count} source(s) could not be read: {paths}")]
    SourcesFailed { count: usize, paths: String },
    #[error("refusing to touch files: no source was loaded, so every image would count as unreferenced")]
    NoSources,
}

#[derive(Debug, Default)]
pub struct Session {
    registry: SourceRegistry,
    inventory: FolderInventory,
    stats: ReconcileStats,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn import_sources<P: AsRef<Path>>(&mut self, paths: &[P]) -> BatchOutcome<SourceError> {
        let outcome = self.registry.import_sources(paths);
        info!(
            imported = outcome.success_count(),
            failed = outcome.failure_count(),
            "imported sources"
        );
        self.refresh();
        outcome
    }

    pub fn reload_sources(&mut self) -> BatchOutcome<SourceError> {
        let outcome = self.registry.reload_all();
        info!(
            reloaded = outcome.success_count(),
            failed = outcome.failure_count(),
            "reloaded sources"
        );
        self.refresh();
        outcome
    }

    /// Scan `root` and make it the current folder. Returns the number of
    /// image files found.
    pub fn select_folder(&mut self, root: &Path) -> Result<usize, ScanError> {
        let result = self.inventory.scan(root).map(|files| files.len());
        // a failed scan empties the inventory, so stats change either way
        self.refresh();
        result
    }

    pub fn rescan_folder(&mut self) -> Result<usize, ScanError> {
        let count = self.inventory.rescan()?.len();
        self.refresh();
        Ok(count)
    }

    pub fn delete_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> BatchOutcome<FileOpError> {
        let outcome = self.inventory.delete(paths);
        info!(
            deleted = outcome.success_count(),
            failed = outcome.failure_count(),
            "deleted files"
        );
        self.refresh();
        outcome
    }

    /// Delete every file no source references.
    pub fn delete_unmatched(&mut self) -> BatchOutcome<FileOpError> {
        let paths = self.reconciliation().unmatched_paths();
        self.delete_files(&paths)
    }

    pub fn move_files<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        destination: &Path,
    ) -> BatchOutcome<FileOpError> {
        let outcome = self.inventory.move_to(paths, destination);
        info!(
            moved = outcome.success_count(),
            failed = outcome.failure_count(),
            destination = %destination.display(),
            "moved files"
        );
        self.refresh();
        outcome
    }

    /// Move every file no source references into `destination`.
    pub fn move_unmatched(&mut self, destination: &Path) -> BatchOutcome<FileOpError> {
        let paths = self.reconciliation().unmatched_paths();
        self.move_files(&paths, destination)
    }

    /// Check that `imported` and the registry are trustworthy enough to
    /// delete or move unmatched files. Any unreadable source, or an empty
    /// registry, would make referenced files look unreferenced.
    pub fn ensure_sources_loaded(
        &self,
        imported: &BatchOutcome<SourceError>,
    ) -> Result<(), SweepRefused> {
        if !imported.is_clean() {
            let paths = imported
                .failures
                .iter()
                .map(|(path, _)| path.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(SweepRefused::SourcesFailed {
                count: imported.failure_count(),
                paths,
            });
        }
        if self.registry.is_empty() {
            return Err(SweepRefused::NoSources);
        }
        Ok(())
    }

    pub fn reconciliation(&self) -> Reconciliation<'_> {
        reconcile(&self.registry.union_references(), self.inventory.files())
    }

    pub fn stats(&self) -> ReconcileStats {
        self.stats
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn inventory(&self) -> &FolderInventory {
        &self.inventory
    }

    pub fn union_references(&self) -> BTreeSet<String> {
        self.registry.union_references()
    }

    /// Referenced names with no file of that name on disk.
    pub fn missing_references(&self) -> Vec<String> {
        let union = self.registry.union_references();
        missing_references(&union, self.inventory.files())
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn refresh(&mut self) {
        self.stats = self.reconciliation().stats;
        debug!(stats = ?self.stats, "reconciled");
    }
}

/// Expand source arguments: files are taken as given, folders contribute
/// every file beneath them that `filter` accepts, in sorted walk order.
pub fn expand_source_paths<P: AsRef<Path>>(paths: &[P], filter: &SourcesConfig) -> Vec<PathBuf> {
    let mut expanded = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if !path.is_dir() {
            expanded.push(path.to_path_buf());
            continue;
        }
        let before = expanded.len();
        expanded.extend(
            WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| is_regular_file(e) && filter.accepts(e.path()))
                .map(|e| e.into_path()),
        );
        debug!(
            folder = %path.display(),
            files = expanded.len() - before,
            "expanded source folder"
        );
    }
    expanded
}
