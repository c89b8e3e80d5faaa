//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Each entity leads with what it *is* (a source and its reference count, a
//! file and its status) with filesystem paths shown as indented `Source:`
//! context or relative to the scanned root.
//!
//! # Output Format
//!
//! ## Report
//!
//! ```text
//! Sources
//! 001 scene.babylon (3 references)
//!     Source: /work/level1/scene.babylon
//!
//! Files
//! 001 [matched]   hero.png (1.50 KB)
//! 002 [unmatched] ui/Coin.PNG (512 B)
//!
//! Referenced   3 names
//! Inventory    2 files, 2.00 KB
//! Matched      1 file, 1.50 KB
//! Unmatched    1 file, 512 B
//! ```
//!
//! ## Clean / Move
//!
//! ```text
//! Deleted 2 files, 1 failed
//!     ui/Coin.PNG: delete failed: permission denied
//! ```
//!
//! ## Resize
//!
//! ```text
//! Resizing 2 files
//! [1/2] hero.png → 512x256
//! [2/2] ui/Coin.PNG failed: cannot decode ...
//! Resized 1 file, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::ResizePreview;
use crate::inventory::InventoryFile;
use crate::reconcile::{GroupStats, ReconcileStats};
use crate::resize::{ResizeEvent, ResizeSummary};
use crate::sources::SourceFile;
use crate::types::BatchOutcome;
use serde::Serialize;
use std::fmt::Display;
use std::path::{Path, PathBuf};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, singular: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {singular}s")
    }
}

/// Show `path` relative to `root` when it lies beneath it.
fn display_path(path: &Path, root: Option<&Path>) -> String {
    root.and_then(|r| path.strip_prefix(r).ok())
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Human-readable byte size with binary (1024) units.
///
/// ```text
/// 0      → 0 B
/// 512    → 512 B
/// 1536   → 1.50 KB
/// 5 MiB  → 5.00 MB
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

/// Failure lines, at most `max_listed`, then a count of the rest.
fn failure_lines<'a, I>(failures: I, total: usize, max_listed: usize, root: Option<&Path>) -> Vec<String>
where
    I: IntoIterator<Item = (&'a PathBuf, String)>,
{
    let mut lines: Vec<String> = failures
        .into_iter()
        .take(max_listed)
        .map(|(path, err)| format!("{}{}: {}", indent(1), display_path(path, root), err))
        .collect();
    if total > max_listed {
        lines.push(format!("{}... and {} more", indent(1), total - max_listed));
    }
    lines
}

// ============================================================================
// Report
// ============================================================================

fn group_line(label: &str, group: &GroupStats) -> String {
    format!(
        "{:<12} {}, {}",
        label,
        plural(group.count, "file"),
        format_size(group.bytes)
    )
}

/// Format the reconciliation statistics block.
pub fn format_stats(stats: &ReconcileStats) -> Vec<String> {
    vec![
        format!("{:<12} {}", "Referenced", plural(stats.referenced, "name")),
        group_line("Inventory", &stats.inventory),
        group_line("Matched", &stats.matched),
        group_line("Unmatched", &stats.unmatched),
    ]
}

/// Format imported sources with their reference counts.
pub fn format_sources(sources: &[SourceFile]) -> Vec<String> {
    let mut lines = vec!["Sources".to_string()];
    if sources.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, source) in sources.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            source.display_name,
            plural(source.reference_count(), "reference")
        ));
        lines.push(format!("{}Source: {}", indent(1), source.path.display()));
    }
    lines
}

/// Format inventory files tagged with whether they are referenced.
pub fn format_file_list(files: &[(&InventoryFile, bool)], root: Option<&Path>) -> Vec<String> {
    let mut lines = vec!["Files".to_string()];
    if files.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, (file, referenced)) in files.iter().enumerate() {
        let status = if *referenced { "[matched]  " } else { "[unmatched]" };
        lines.push(format!(
            "{} {} {} ({})",
            format_index(i + 1),
            status,
            display_path(&file.path, root),
            format_size(file.size)
        ));
    }
    lines
}

/// Format referenced names that have no file on disk.
pub fn format_missing(missing: &[String]) -> Vec<String> {
    if missing.is_empty() {
        return vec!["Every referenced image is present".to_string()];
    }
    let mut lines = vec![format!("Missing ({})", missing.len())];
    lines.extend(
        missing
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{} {}", format_index(i + 1), name)),
    );
    lines
}

/// Print the text report to stdout.
pub fn print_report(
    sources: &[SourceFile],
    files: &[(&InventoryFile, bool)],
    root: Option<&Path>,
    stats: &ReconcileStats,
) {
    let mut lines = format_sources(sources);
    lines.push(String::new());
    lines.extend(format_file_list(files, root));
    lines.push(String::new());
    lines.extend(format_stats(stats));
    print_lines(&lines);
}

pub fn print_missing(missing: &[String]) {
    print_lines(&format_missing(missing));
}

#[derive(Debug, Serialize)]
struct JsonSource<'a> {
    path: &'a Path,
    references: usize,
}

#[derive(Debug, Serialize)]
struct JsonFile<'a> {
    #[serde(flatten)]
    file: &'a InventoryFile,
    referenced: bool,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    stats: &'a ReconcileStats,
    sources: Vec<JsonSource<'a>>,
    files: Vec<JsonFile<'a>>,
    missing: &'a [String],
}

/// Render the report as pretty JSON for `report --json`.
pub fn format_report_json(
    sources: &[SourceFile],
    files: &[(&InventoryFile, bool)],
    stats: &ReconcileStats,
    missing: &[String],
) -> Result<String, serde_json::Error> {
    let report = JsonReport {
        stats,
        sources: sources
            .iter()
            .map(|s| JsonSource {
                path: &s.path,
                references: s.reference_count(),
            })
            .collect(),
        files: files
            .iter()
            .map(|(file, referenced)| JsonFile {
                file,
                referenced: *referenced,
            })
            .collect(),
        missing,
    };
    serde_json::to_string_pretty(&report)
}

// ============================================================================
// Clean / Move
// ============================================================================

/// Summarise a delete or move batch. `verb` is the past tense ("Deleted").
pub fn format_batch_summary<E: Display>(
    verb: &str,
    outcome: &BatchOutcome<E>,
    max_listed: usize,
    root: Option<&Path>,
) -> Vec<String> {
    let mut header = format!("{} {}", verb, plural(outcome.success_count(), "file"));
    if outcome.failure_count() > 0 {
        header.push_str(&format!(", {} failed", outcome.failure_count()));
    }
    let mut lines = vec![header];
    lines.extend(failure_lines(
        outcome.failures.iter().map(|(p, e)| (p, e.to_string())),
        outcome.failure_count(),
        max_listed,
        root,
    ));
    lines
}

pub fn print_batch_summary<E: Display>(
    verb: &str,
    outcome: &BatchOutcome<E>,
    max_listed: usize,
    root: Option<&Path>,
) {
    print_lines(&format_batch_summary(verb, outcome, max_listed, root));
}

/// Lines listing what a destructive command is about to act on.
pub fn format_pending(action: &str, files: &[&InventoryFile], root: Option<&Path>) -> Vec<String> {
    let total: u64 = files.iter().map(|f| f.size).sum();
    let mut lines = vec![format!(
        "{} {} ({})",
        action,
        plural(files.len(), "unreferenced file"),
        format_size(total)
    )];
    lines.extend(
        files
            .iter()
            .map(|f| format!("{}{}", indent(1), display_path(&f.path, root))),
    );
    lines
}

// ============================================================================
// Resize
// ============================================================================

/// One preview line: dimensions and estimated size change.
pub fn format_resize_preview(path: &Path, preview: &ResizePreview, root: Option<&Path>) -> String {
    format!(
        "{} {}x{} \u{2192} {}x{} ({} \u{2192} ~{})",
        display_path(path, root),
        preview.original.0,
        preview.original.1,
        preview.target.0,
        preview.target.1,
        format_size(preview.original_size),
        format_size(preview.estimated_size)
    )
}

/// Format a single resize progress event.
pub fn format_resize_event(event: &ResizeEvent, root: Option<&Path>) -> Vec<String> {
    match event {
        ResizeEvent::Started { total } => vec![format!("Resizing {}", plural(*total, "file"))],
        ResizeEvent::Item {
            index,
            total,
            path,
            result,
            ..
        } => {
            let line = match result {
                Ok((w, h)) => format!(
                    "[{index}/{total}] {} \u{2192} {w}x{h}",
                    display_path(path, root)
                ),
                Err(err) => format!(
                    "[{index}/{total}] {} failed: {err}",
                    display_path(path, root)
                ),
            };
            vec![line]
        }
        // the summary is printed once the worker is joined
        ResizeEvent::Finished(_) => Vec::new(),
    }
}

pub fn format_resize_summary(
    summary: &ResizeSummary,
    max_listed: usize,
    root: Option<&Path>,
) -> Vec<String> {
    let mut header = format!("Resized {}", plural(summary.succeeded, "file"));
    if summary.failed > 0 {
        header.push_str(&format!(", {} failed", summary.failed));
    }
    if summary.cancelled {
        header.push_str(" (cancelled)");
    }
    let mut lines = vec![header];
    lines.extend(failure_lines(
        summary.failures.iter().map(|(p, e)| (p, e.clone())),
        summary.failures.len(),
        max_listed,
        root,
    ));
    lines
}

pub fn print_resize_summary(summary: &ResizeSummary, max_listed: usize, root: Option<&Path>) {
    print_lines(&format_resize_summary(summary, max_listed, root));
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
