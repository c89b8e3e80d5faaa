//! Reconciliation of referenced names against files on disk.
//!
//! The classification is purely by case-insensitive basename: a file is
//! *matched* when its lower-cased name appears in the reference union, no
//! matter which directory either side lives in. Everything else in the
//! inventory is *unmatched*, i.e. a candidate for cleanup.
//!
//! Statistics are deliberately asymmetric. References are names, not files,
//! so the referenced group carries a count but no byte size; the three
//! inventory groups carry both.
//!
//! All functions here are pure and recomputed on demand.

use crate::inventory::InventoryFile;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// Count and total byte size of a group of files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub bytes: u64,
}

impl GroupStats {
    fn of<'a>(files: impl IntoIterator<Item = &'a InventoryFile>) -> Self {
        files.into_iter().fold(Self::default(), |acc, f| Self {
            count: acc.count + 1,
            bytes: acc.bytes + f.size,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    /// Distinct referenced names.
    pub referenced: usize,
    pub inventory: GroupStats,
    pub matched: GroupStats,
    pub unmatched: GroupStats,
}

/// Three-way view over a reference union and an inventory snapshot.
#[derive(Debug, Serialize)]
pub struct Reconciliation<'a> {
    pub matched: Vec<&'a InventoryFile>,
    pub unmatched: Vec<&'a InventoryFile>,
    pub stats: ReconcileStats,
}

impl Reconciliation<'_> {
    pub fn matched_paths(&self) -> Vec<std::path::PathBuf> {
        self.matched.iter().map(|f| f.path.clone()).collect()
    }

    pub fn unmatched_paths(&self) -> Vec<std::path::PathBuf> {
        self.unmatched.iter().map(|f| f.path.clone()).collect()
    }
}

/// Partition `inventory` into files referenced by `union` and files that are not.
pub fn reconcile<'a>(union: &BTreeSet<String>, inventory: &'a [InventoryFile]) -> Reconciliation<'a> {
    let (matched, unmatched): (Vec<&InventoryFile>, Vec<&InventoryFile>) = inventory
        .iter()
        .partition(|f| union.contains(&f.reference_key()));

    let stats = ReconcileStats {
        referenced: union.len(),
        inventory: GroupStats::of(inventory),
        matched: GroupStats::of(matched.iter().copied()),
        unmatched: GroupStats::of(unmatched.iter().copied()),
    };

    Reconciliation {
        matched,
        unmatched,
        stats,
    }
}

/// Referenced names with no file of that name anywhere in the inventory.
pub fn missing_references<'a>(
    union: &'a BTreeSet<String>,
    inventory: &[InventoryFile],
) -> Vec<&'a str> {
    let present = present_keys(inventory);
    union
        .iter()
        .filter(|name| !present.contains(name.as_str()))
        .map(String::as_str)
        .collect()
}

fn present_keys(inventory: &[InventoryFile]) -> HashSet<String> {
    inventory.iter().map(InventoryFile::reference_key).collect()
}

/// Which side of the partition a file listing shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Matched,
    Unmatched,
}

/// Listing filter for inventory files: partition side plus a path search.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub status: StatusFilter,
    /// Case-insensitive substring matched against the full path.
    pub search: Option<String>,
}

impl FileFilter {
    /// Apply the filter, tagging each kept file with whether it is referenced.
    pub fn apply<'a>(
        &self,
        union: &BTreeSet<String>,
        inventory: &'a [InventoryFile],
    ) -> Vec<(&'a InventoryFile, bool)> {
        let needle = self.search.as_deref().map(str::to_lowercase);
        inventory
            .iter()
            .map(|f| (f, union.contains(&f.reference_key())))
            .filter(|(_, referenced)| match self.status {
                StatusFilter::All => true,
                StatusFilter::Matched => *referenced,
                StatusFilter::Unmatched => !*referenced,
            })
            .filter(|(f, _)| match &needle {
                Some(n) => f.path.to_string_lossy().to_lowercase().contains(n.as_str()),
                None => true,
            })
            .collect()
    }
}

/// Listing filter for referenced names: extension suffix plus a name search.
#[derive(Debug, Clone, Default)]
pub struct ReferenceFilter {
    /// Keep only names ending in this extension (with or without the dot).
    pub extension: Option<String>,
    pub search: Option<String>,
}

impl ReferenceFilter {
    /// Apply the filter, tagging each kept name with whether a file of that
    /// name is present in the inventory.
    pub fn apply<'a>(
        &self,
        union: &'a BTreeSet<String>,
        inventory: &[InventoryFile],
    ) -> Vec<(&'a str, bool)> {
        let present = present_keys(inventory);
        let suffix = self
            .extension
            .as_deref()
            .map(|e| format!(".{}", e.trim_start_matches('.').to_lowercase()));
        let needle = self.search.as_deref().map(str::to_lowercase);
        union
            .iter()
            .filter(|name| suffix.as_deref().is_none_or(|s| name.ends_with(s)))
            .filter(|name| needle.as_deref().is_none_or(|n| name.contains(n)))
            .map(|name| (name.as_str(), present.contains(name.as_str())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file(dir: &str, name: &str, size: u64) -> InventoryFile {
        InventoryFile {
            path: PathBuf::from(dir).join(name),
            name: name.to_string(),
            size,
            source_folder: PathBuf::from(dir),
        }
    }

    fn union(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn names(files: &[&InventoryFile]) -> Vec<String> {
        files.iter().map(|f| f.name.clone()).collect()
    }

    #[test]
    fn end_to_end_scenario() {
        let refs = union(&["hero.png", "sword.png", "armor.png"]);
        let inventory = vec![file("/a", "hero.png", 100), file("/a", "shield.png", 40)];

        let result = reconcile(&refs, &inventory);

        assert_eq!(names(&result.matched), vec!["hero.png"]);
        assert_eq!(names(&result.unmatched), vec!["shield.png"]);
        assert_eq!(result.stats.referenced, 3);
        assert_eq!(result.stats.matched, GroupStats { count: 1, bytes: 100 });
        assert_eq!(result.stats.unmatched, GroupStats { count: 1, bytes: 40 });
        assert_eq!(result.stats.inventory, GroupStats { count: 2, bytes: 140 });
    }

    #[test]
    fn matching_ignores_case_and_directory() {
        let refs = union(&["coin.png"]);
        let inventory = vec![file("/x/ui", "Coin.PNG", 1), file("/y/other", "COIN.png", 2)];

        let result = reconcile(&refs, &inventory);

        assert_eq!(result.stats.matched.count, 2);
        assert!(result.unmatched.is_empty());
    }

    #[test]
    fn partition_covers_inventory_without_overlap() {
        let refs = union(&["a.png", "c.png", "z.png"]);
        let inventory = vec![
            file("/r", "a.png", 1),
            file("/r", "b.png", 2),
            file("/r", "C.png", 3),
            file("/r", "d.png", 4),
        ];

        let result = reconcile(&refs, &inventory);

        let mut all: Vec<&PathBuf> = result
            .matched
            .iter()
            .chain(result.unmatched.iter())
            .map(|f| &f.path)
            .collect();
        all.sort();
        let mut expected: Vec<&PathBuf> = inventory.iter().map(|f| &f.path).collect();
        expected.sort();
        assert_eq!(all, expected);
        assert!(result.matched.iter().all(|m| !result.unmatched.contains(m)));
        assert_eq!(
            result.stats.matched.bytes + result.stats.unmatched.bytes,
            result.stats.inventory.bytes
        );
    }

    #[test]
    fn empty_union_leaves_everything_unmatched() {
        let inventory = vec![file("/r", "a.png", 1)];
        let result = reconcile(&BTreeSet::new(), &inventory);
        assert_eq!(result.stats.referenced, 0);
        assert_eq!(result.stats.unmatched.count, 1);
    }

    #[test]
    fn missing_references_lists_names_without_files() {
        let refs = union(&["hero.png", "sword.png", "armor.png"]);
        let inventory = vec![file("/a", "Hero.png", 1), file("/a", "shield.png", 1)];

        assert_eq!(missing_references(&refs, &inventory), vec!["armor.png", "sword.png"]);
    }

    #[test]
    fn file_filter_by_status_and_search() {
        let refs = union(&["hero.png"]);
        let inventory = vec![
            file("/assets/chars", "hero.png", 1),
            file("/assets/chars", "villain.png", 1),
            file("/assets/ui", "button.png", 1),
        ];

        let unmatched = FileFilter {
            status: StatusFilter::Unmatched,
            search: None,
        }
        .apply(&refs, &inventory);
        assert_eq!(unmatched.len(), 2);
        assert!(unmatched.iter().all(|(_, referenced)| !referenced));

        let chars = FileFilter {
            status: StatusFilter::All,
            search: Some("CHARS".to_string()),
        }
        .apply(&refs, &inventory);
        assert_eq!(chars.len(), 2);
        assert!(chars[0].1);
    }

    #[test]
    fn reference_filter_by_extension_and_search() {
        let refs = union(&["hero.png", "hero_n.jpg", "sky.png"]);
        let inventory = vec![file("/a", "hero.png", 1)];

        let pngs = ReferenceFilter {
            extension: Some(".PNG".to_string()),
            search: None,
        }
        .apply(&refs, &inventory);
        assert_eq!(pngs, vec![("hero.png", true), ("sky.png", false)]);

        let heroes = ReferenceFilter {
            extension: None,
            search: Some("hero".to_string()),
        }
        .apply(&refs, &inventory);
        assert_eq!(heroes, vec![("hero.png", true), ("hero_n.jpg", false)]);
    }
}
