//! Source registry: the imported text descriptors and what they reference.
//!
//! Each imported file becomes a [`SourceFile`] holding its extracted
//! reference set. The registry is the only owner of these entries; everything
//! else reads the derived [`SourceRegistry::union_references`] snapshot, which
//! is recomputed from scratch on every call.
//!
//! Importing the same path twice is allowed and creates two entries. Both
//! contribute to the union, which is unaffected by the duplication since set
//! union is idempotent.

use crate::extract::extract;
use crate::types::BatchOutcome;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} is not valid UTF-8 text", path.display())]
    Decode { path: PathBuf },
}

/// An imported text source and the image names it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Identity of the entry; stable across reloads.
    pub path: PathBuf,
    /// File name shown in listings.
    pub display_name: String,
    /// Lower-cased basenames extracted from the file's text.
    pub references: BTreeSet<String>,
}

impl SourceFile {
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }
}

#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: Vec<SourceFile>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and extract every path, appending one entry per readable file.
    ///
    /// A failing file is recorded in the outcome and the rest of the batch
    /// still runs.
    pub fn import_sources<P: AsRef<Path>>(&mut self, paths: &[P]) -> BatchOutcome<SourceError> {
        let mut outcome = BatchOutcome::new();
        for path in paths {
            let path = path.as_ref();
            match read_references(path) {
                Ok(references) => {
                    debug!(path = %path.display(), count = references.len(), "imported source");
                    self.sources.push(SourceFile {
                        path: path.to_path_buf(),
                        display_name: display_name(path),
                        references,
                    });
                    outcome.success(path.to_path_buf());
                }
                Err(err) => outcome.failure(path.to_path_buf(), err),
            }
        }
        outcome
    }

    /// Re-read every source whose file still exists and replace its
    /// references in place.
    ///
    /// Sources whose file has disappeared keep their last known references
    /// and are only logged. A file that exists but can no longer be read is
    /// reported and also keeps its previous references.
    pub fn reload_all(&mut self) -> BatchOutcome<SourceError> {
        let mut outcome = BatchOutcome::new();
        for source in &mut self.sources {
            if !source.path.exists() {
                warn!(path = %source.path.display(), "source no longer exists, keeping stale references");
                continue;
            }
            match read_references(&source.path) {
                Ok(references) => {
                    source.references = references;
                    outcome.success(source.path.clone());
                }
                Err(err) => outcome.failure(source.path.clone(), err),
            }
        }
        outcome
    }

    /// The deduplicated union of all references across every entry.
    pub fn union_references(&self) -> BTreeSet<String> {
        self.sources
            .iter()
            .flat_map(|s| s.references.iter().cloned())
            .collect()
    }

    pub fn sources(&self) -> &[SourceFile] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

fn read_references(path: &Path) -> Result<BTreeSet<String>, SourceError> {
    let bytes = fs::read(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| SourceError::Decode {
        path: path.to_path_buf(),
    })?;
    Ok(extract(&text))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_file;
    use tempfile::TempDir;

    #[test]
    fn import_extracts_references_per_file() {
        let tmp = TempDir::new().unwrap();
        let scene = write_file(tmp.path(), "scene.babylon", r#"{"name":"hero.PNG"}"#);
        let ui = write_file(tmp.path(), "ui.js", "load('coin.png'); load('hero.png');");

        let mut registry = SourceRegistry::new();
        let outcome = registry.import_sources(&[&scene, &ui]);

        assert!(outcome.is_clean());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.sources()[0].display_name, "scene.babylon");
        assert_eq!(registry.sources()[0].reference_count(), 1);
        assert_eq!(registry.sources()[1].reference_count(), 2);
        let union: Vec<_> = registry.union_references().into_iter().collect();
        assert_eq!(union, vec!["coin.png", "hero.png"]);
    }

    #[test]
    fn one_bad_file_does_not_abort_the_batch() {
        let tmp = TempDir::new().unwrap();
        let good = write_file(tmp.path(), "good.json", r#""a.png""#);
        let missing = tmp.path().join("missing.json");
        let binary = tmp.path().join("binary.txt");
        fs::write(&binary, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let also_good = write_file(tmp.path(), "also.txt", "b.jpg");

        let mut registry = SourceRegistry::new();
        let outcome = registry.import_sources(&[&good, &missing, &binary, &also_good]);

        assert_eq!(outcome.success_count(), 2);
        assert_eq!(outcome.failure_count(), 2);
        assert!(matches!(outcome.failures[0].1, SourceError::Read { .. }));
        assert!(matches!(outcome.failures[1].1, SourceError::Decode { .. }));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn duplicate_import_creates_two_entries_with_same_union() {
        let tmp = TempDir::new().unwrap();
        let scene = write_file(tmp.path(), "scene.json", r#""a.png" "b.png""#);

        let mut registry = SourceRegistry::new();
        registry.import_sources(&[&scene]);
        let before = registry.union_references();
        registry.import_sources(&[&scene]);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.union_references(), before);
    }

    #[test]
    fn reload_replaces_references_in_place() {
        let tmp = TempDir::new().unwrap();
        let scene = write_file(tmp.path(), "scene.json", r#""old.png""#);

        let mut registry = SourceRegistry::new();
        registry.import_sources(&[&scene]);
        fs::write(&scene, r#""new.png" "other.png""#).unwrap();
        let outcome = registry.reload_all();

        assert_eq!(outcome.success_count(), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.sources()[0].path, scene);
        assert_eq!(registry.sources()[0].reference_count(), 2);
        assert!(!registry.union_references().contains("old.png"));
    }

    #[test]
    fn reload_keeps_stale_entry_when_file_is_gone() {
        let tmp = TempDir::new().unwrap();
        let scene = write_file(tmp.path(), "scene.json", r#""kept.png""#);

        let mut registry = SourceRegistry::new();
        registry.import_sources(&[&scene]);
        fs::remove_file(&scene).unwrap();
        let outcome = registry.reload_all();

        assert!(outcome.is_clean());
        assert_eq!(outcome.success_count(), 0);
        assert!(registry.union_references().contains("kept.png"));
    }

    #[test]
    fn reload_reports_undecodable_file_and_keeps_references() {
        let tmp = TempDir::new().unwrap();
        let scene = write_file(tmp.path(), "scene.json", r#""kept.png""#);

        let mut registry = SourceRegistry::new();
        registry.import_sources(&[&scene]);
        fs::write(&scene, [0xc3, 0x28]).unwrap();
        let outcome = registry.reload_all();

        assert_eq!(outcome.failure_count(), 1);
        assert!(registry.union_references().contains("kept.png"));
    }

    #[test]
    fn union_is_case_folded_across_sources() {
        let tmp = TempDir::new().unwrap();
        let a = write_file(tmp.path(), "a.txt", "Hero.PNG");
        let b = write_file(tmp.path(), "b.txt", "HERO.png");

        let mut registry = SourceRegistry::new();
        registry.import_sources(&[a, b]);

        assert_eq!(registry.union_references().len(), 1);
    }
}
