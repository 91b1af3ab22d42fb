//! Background worker plumbing.
//!
//! Exactly one background job may be active at a time for any long-running
//! operation (folder scan, batch suggestion run, commit run, single-image
//! suggestion). The worker thread owns the operation's data and pushes thin
//! `WorkerEvent` notifications back to the interactive loop over an mpsc
//! channel; events arrive in the order they were produced, and the
//! interactive thread never blocks waiting on the worker.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use thiserror::Error;

use crate::batch::{BatchPipeline, BatchProgress, BatchReport, SUGGESTION_PROMPT};
use crate::errlog::ErrorLog;
use crate::exiftool::KeywordWriter;
use crate::normalizer::TagNormalizer;
use crate::ollama::SuggestionClient;
use crate::review::{CommitProgress, CommitReport, ReviewQueue};
use crate::scan::{self, ScanError};

/// Returned when a job is requested while another is still running.
#[derive(Debug, Error)]
#[error("a background task is already running")]
pub struct WorkerBusy;

/// Which records a commit job writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// Only records with the acceptance flag set.
    Selected,
    /// Every record regardless of flag.
    All,
}

/// Notifications pushed from the worker thread to the interactive loop.
pub enum WorkerEvent {
    ScanFinished(Result<Vec<PathBuf>, ScanError>),
    /// A single-image suggestion finished; `Ok` carries the canonical tags.
    SuggestFinished {
        path: PathBuf,
        result: Result<String, String>,
    },
    BatchProgress(BatchProgress),
    BatchFinished(BatchReport),
    CommitProgress(CommitProgress),
    CommitFinished(CommitReport),
}

/// Handle enforcing the one-active-job discipline.
#[derive(Default)]
pub struct Worker {
    current: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a previously spawned job thread is still running.
    pub fn is_busy(&self) -> bool {
        self.current.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawns `job` on a fresh thread, or refuses if one is still active.
    fn spawn(&mut self, job: impl FnOnce() + Send + 'static) -> Result<(), WorkerBusy> {
        if self.is_busy() {
            return Err(WorkerBusy);
        }
        self.current = Some(std::thread::spawn(job));
        Ok(())
    }

    /// Scans `root` for supported images in the background.
    pub fn spawn_scan(&mut self, root: PathBuf, tx: Sender<WorkerEvent>) -> Result<(), WorkerBusy> {
        self.spawn(move || {
            let result = scan::scan_folder(&root);
            let _ = tx.send(WorkerEvent::ScanFinished(result));
        })
    }

    /// Requests tags for one image in the background.
    ///
    /// Failures are logged here (the interactive loop only shows a short
    /// notice) and delivered as an `Err` payload, never a panic.
    pub fn spawn_suggest(
        &mut self,
        client: Arc<dyn SuggestionClient>,
        log: ErrorLog,
        path: PathBuf,
        model: String,
        tx: Sender<WorkerEvent>,
    ) -> Result<(), WorkerBusy> {
        self.spawn(move || {
            let result = std::fs::read(&path)
                .map_err(|e| format!("could not read file: {e}"))
                .and_then(|bytes| {
                    client
                        .suggest(&model, SUGGESTION_PROMPT, &bytes)
                        .map_err(|e| e.to_string())
                })
                .map(|raw| TagNormalizer::normalize(&raw));

            if let Err(reason) = &result {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                let _ = log.append(&format!("Suggestion failed for {name}: {reason}"));
            }

            let _ = tx.send(WorkerEvent::SuggestFinished { path, result });
        })
    }

    /// Runs the batch pipeline in the background, forwarding each progress
    /// update as it is produced.
    pub fn spawn_batch(
        &mut self,
        pipeline: BatchPipeline,
        paths: Vec<PathBuf>,
        model: String,
        tx: Sender<WorkerEvent>,
    ) -> Result<(), WorkerBusy> {
        self.spawn(move || {
            let progress_tx = tx.clone();
            let report = pipeline.run(&paths, &model, move |progress| {
                let _ = progress_tx.send(WorkerEvent::BatchProgress(progress));
            });
            let _ = tx.send(WorkerEvent::BatchFinished(report));
        })
    }

    /// Runs a commit pass in the background over a snapshot of the review
    /// queue.
    pub fn spawn_commit(
        &mut self,
        queue: ReviewQueue,
        mode: CommitMode,
        writer: Arc<dyn KeywordWriter>,
        log: ErrorLog,
        tx: Sender<WorkerEvent>,
    ) -> Result<(), WorkerBusy> {
        self.spawn(move || {
            let progress_tx = tx.clone();
            let on_progress = move |progress: CommitProgress| {
                let _ = progress_tx.send(WorkerEvent::CommitProgress(progress));
            };
            let report = match mode {
                CommitMode::Selected => queue.apply_selected(writer.as_ref(), &log, on_progress),
                CommitMode::All => queue.apply_all(writer.as_ref(), &log, on_progress),
            };
            let _ = tx.send(WorkerEvent::CommitFinished(report));
        })
    }

    /// Blocks until the current job (if any) finishes. Test helper.
    #[cfg(test)]
    fn join(&mut self) {
        if let Some(handle) = self.current.take() {
            let _ = handle.join();
        }
    }
}
