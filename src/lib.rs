//! # texture-sweep
//!
//! Finds image assets that no scene descriptor references, and deletes,
//! moves or resizes them in bulk.
//!
//! Game and web asset folders accumulate textures nobody loads any more.
//! texture-sweep reads the text files that describe a scene (JSON, JS,
//! `.babylon`, plain text), pulls every image filename out of them, and
//! cross-references those names against the images on disk.
//!
//! # Architecture: Reference Reconciliation
//!
//! ```text
//! sources ──extract──► reference union ─┐
//!                                       ├─ reconcile ─► matched / unmatched / missing
//! folder ───scan────► inventory ────────┘                 │
//!                                                         ├─ delete / move
//!                                                         └─ resize (worker thread)
//! ```
//!
//! Matching is by case-insensitive basename only: `textures/Hero.PNG` in a
//! descriptor matches `hero.png` anywhere under the scanned folder.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`extract`] | Pulls image filenames out of arbitrary text with three pattern families |
//! | [`sources`] | Registry of imported text sources and their reference sets |
//! | [`inventory`] | Recursive image scan of a folder, plus delete and move |
//! | [`reconcile`] | Matched / unmatched partition, statistics, listing filters |
//! | [`resize`] | Per-file resize plans and the cancellable batch worker |
//! | [`imaging`] | Dimension math, size estimates, and the `image`-crate backend |
//! | [`session`] | Operator command surface that keeps statistics current |
//! | [`config`] | `texture-sweep.toml` loading, validation, and merging |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`types`] | Shared batch outcome type |
//!
//! # Design Decisions
//!
//! ## Nothing Is Transactional
//!
//! Delete, move and resize act file by file. A failure is recorded in the
//! batch outcome and the batch continues; earlier files stay deleted, moved
//! or resized. The summary lists what failed and why.
//!
//! ## Resize Never Blocks the Caller
//!
//! Resizing decodes full images and can take a while on large texture sets.
//! [`resize::spawn_batch`] runs the work on its own thread and streams
//! progress events over a channel; the caller can cancel between items.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module decodes and re-encodes with the `image` crate
//! (Lanczos3 resampling). No ImageMagick, no system libraries.

pub mod config;
pub mod extract;
pub mod imaging;
pub mod inventory;
pub mod logging;
pub mod output;
pub mod reconcile;
pub mod resize;
pub mod session;
pub mod sources;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
