//! Resize planning and batch execution.
//!
//! The [`ResizePlanner`] holds the editable plan an operator tweaks and a
//! sparse map of plans applied to individual inventory paths. Paths without a
//! stored plan fall back to the configured defaults.
//!
//! ```text
//! select([a.png, b.png])      editor ← defaults
//! editor_mut().ratio_value = 25
//! apply_to_selection()        plans = { a.png: 25%, b.png: 25% }
//! select([c.png])             editor ← defaults, plans unchanged
//! resolve_plan(c.png)         defaults
//! ```
//!
//! ## Batch execution
//!
//! [`spawn_batch`] runs a list of [`ResizeTask`]s on a dedicated worker
//! thread and reports [`ResizeEvent`]s over an `mpsc` channel:
//!
//! ```text
//! Started { total: 3 }
//! Item { index: 1, total: 3, path: a.png, result: Ok(256x128), .. }
//! Item { index: 2, total: 3, path: b.png, result: Err(..), .. }
//! Item { index: 3, .. }
//! Finished(ResizeSummary { succeeded: 2, failed: 1, cancelled: false, .. })
//! ```
//!
//! Cancellation is checked before every item; the item in flight always
//! completes. One failed item never aborts the batch.

use crate::imaging::{
    BackendError, ImageBackend, OutputTarget, ResizePlan, ResizePreview, get_dimensions,
    preview_resize, resize_file,
};
use crate::inventory::InventoryFile;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("resize worker panicked")]
    WorkerPanicked,
}

// ============================================================================
// Planner
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResizePlanner {
    defaults: ResizePlan,
    plans: HashMap<PathBuf, ResizePlan>,
    selection: Vec<PathBuf>,
    editor: ResizePlan,
}

impl ResizePlanner {
    pub fn new(defaults: ResizePlan) -> Self {
        Self {
            defaults,
            plans: HashMap::new(),
            selection: Vec::new(),
            editor: defaults,
        }
    }

    pub fn defaults(&self) -> &ResizePlan {
        &self.defaults
    }

    /// Replace the selection. The editable plan goes back to the defaults;
    /// plans already applied to paths are kept.
    pub fn select<P: AsRef<Path>>(&mut self, paths: &[P]) {
        self.selection = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
        self.editor = self.defaults;
    }

    pub fn selection(&self) -> &[PathBuf] {
        &self.selection
    }

    pub fn editor(&self) -> &ResizePlan {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut ResizePlan {
        &mut self.editor
    }

    /// Store a copy of the editable plan for every selected path.
    /// Returns how many paths received it.
    pub fn apply_to_selection(&mut self) -> usize {
        for path in &self.selection {
            self.plans.insert(path.clone(), self.editor);
        }
        debug!(paths = self.selection.len(), plan = ?self.editor, "applied resize plan");
        self.selection.len()
    }

    /// The plan explicitly applied to `path`, if any.
    pub fn plan_for(&self, path: &Path) -> Option<&ResizePlan> {
        self.plans.get(path)
    }

    /// The plan a batch would use for `path`.
    pub fn resolve_plan(&self, path: &Path) -> ResizePlan {
        self.plans.get(path).copied().unwrap_or(self.defaults)
    }

    pub fn clear_plans(&mut self) {
        self.plans.clear();
    }

    /// Preview the editable plan against one file. Only the image header is
    /// read.
    pub fn preview(
        &self,
        backend: &impl ImageBackend,
        file: &InventoryFile,
    ) -> Result<ResizePreview, BackendError> {
        let original = get_dimensions(backend, &file.path)?;
        Ok(preview_resize(original, file.size, &self.editor))
    }

    /// One task per file, each carrying its resolved plan.
    pub fn tasks<'a>(&self, files: impl IntoIterator<Item = &'a InventoryFile>) -> Vec<ResizeTask> {
        files
            .into_iter()
            .map(|file| ResizeTask {
                path: file.path.clone(),
                plan: self.resolve_plan(&file.path),
            })
            .collect()
    }
}

impl Default for ResizePlanner {
    fn default() -> Self {
        Self::new(ResizePlan::default())
    }
}

// ============================================================================
// Batch execution
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeTask {
    pub path: PathBuf,
    pub plan: ResizePlan,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResizeSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// True when the batch stopped before reaching every task.
    pub cancelled: bool,
    pub failures: Vec<(PathBuf, String)>,
}

#[derive(Debug, Clone)]
pub enum ResizeEvent {
    Started {
        total: usize,
    },
    Item {
        /// 1-based position in the batch.
        index: usize,
        total: usize,
        path: PathBuf,
        /// Written dimensions, or the error message.
        result: Result<(u32, u32), String>,
        succeeded: usize,
        failed: usize,
    },
    Finished(ResizeSummary),
}

/// Handle to a running batch.
pub struct ResizeBatch {
    events: Receiver<ResizeEvent>,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<ResizeSummary>,
}

impl ResizeBatch {
    pub fn events(&self) -> &Receiver<ResizeEvent> {
        &self.events
    }

    /// Ask the worker to stop before its next item.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// A flag that cancels this batch when set, usable from another thread.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Wait for the worker and return its summary.
    pub fn join(self) -> Result<ResizeSummary, ResizeError> {
        self.handle.join().map_err(|_| ResizeError::WorkerPanicked)
    }
}

/// Run `tasks` on a new worker thread.
pub fn spawn_batch<B>(backend: B, tasks: Vec<ResizeTask>, target: OutputTarget) -> ResizeBatch
where
    B: ImageBackend + 'static,
{
    let (tx, rx) = mpsc::channel();
    let cancel = Arc::new(AtomicBool::new(false));
    let worker_cancel = Arc::clone(&cancel);
    let handle = thread::spawn(move || run_batch(&backend, &tasks, &target, &worker_cancel, &tx));
    ResizeBatch {
        events: rx,
        cancel,
        handle,
    }
}

/// Execute a batch on the calling thread.
///
/// Events are sent best-effort: a dropped receiver does not stop the batch.
pub fn run_batch(
    backend: &impl ImageBackend,
    tasks: &[ResizeTask],
    target: &OutputTarget,
    cancel: &AtomicBool,
    events: &Sender<ResizeEvent>,
) -> ResizeSummary {
    let total = tasks.len();
    let mut summary = ResizeSummary::default();
    events.send(ResizeEvent::Started { total }).ok();

    for (i, task) in tasks.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            summary.cancelled = true;
            info!(done = i, total, "resize batch cancelled");
            break;
        }

        let result = resize_file(backend, &task.path, &task.plan, target).map_err(|e| e.to_string());
        match &result {
            Ok((w, h)) => {
                debug!(path = %task.path.display(), width = w, height = h, "resized");
                summary.succeeded += 1;
            }
            Err(message) => {
                debug!(path = %task.path.display(), error = %message, "resize failed");
                summary.failed += 1;
                summary.failures.push((task.path.clone(), message.clone()));
            }
        }

        events
            .send(ResizeEvent::Item {
                index: i + 1,
                total,
                path: task.path.clone(),
                result,
                succeeded: summary.succeeded,
                failed: summary.failed,
            })
            .ok();
    }

    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "resize batch finished"
    );
    events.send(ResizeEvent::Finished(summary.clone())).ok();
    summary
}
