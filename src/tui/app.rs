use std::time::Duration;

use crate::review::ReviewQueue;
use crate::session::Session;
use crate::worker::WorkerEvent;

/// Rough per-image suggestion time, used for the up-front estimate shown
/// after a scan (real timing samples replace it once a batch runs).
const EST_SECS_PER_IMAGE: f64 = 1.5;

/// What the interactive loop is currently showing.
///
/// Phases with payloads carry the latest progress numbers so rendering
/// never has to reach into worker state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Navigating the loaded images (or waiting for a scan).
    Browse,
    /// Background folder scan in flight.
    Scanning,
    /// Single-image suggestion in flight.
    Suggesting,
    /// Batch suggestion run in flight.
    Batch {
        processed: usize,
        total: usize,
        remaining: Option<Duration>,
    },
    /// Inspecting the batch's suggestions.
    Review,
    /// Commit run in flight.
    Commit { attempted: usize, total: usize },
}

/// Which text buffer an edit session targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// The tag entry for the current image in the browse view.
    BrowseTags,
    /// The tag text of the selected review record.
    ReviewTags,
}

/// Application state for the TUI.
///
/// Owns the session and the review queue; long-running work happens on the
/// background worker, which reports back through `on_worker_event`.
#[derive(Debug)]
pub struct App {
    session: Session,
    phase: Phase,
    queue: ReviewQueue,
    review_cursor: usize,
    editing: Option<EditTarget>,
    /// Tag entry for the current image in the browse view.
    tag_input: String,
    /// One-line status shown at the bottom of the screen.
    status: String,
    /// Failure count of the most recent batch, for the review header.
    last_batch_failures: usize,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            phase: Phase::Browse,
            queue: ReviewQueue::default(),
            review_cursor: 0,
            editing: None,
            tag_input: String::new(),
            status: String::new(),
            last_batch_failures: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// True while a worker-backed phase is in flight.
    pub fn is_running(&self) -> bool {
        matches!(
            self.phase,
            Phase::Scanning | Phase::Suggesting | Phase::Batch { .. } | Phase::Commit { .. }
        )
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn tag_input(&self) -> &str {
        &self.tag_input
    }

    pub fn queue(&self) -> &ReviewQueue {
        &self.queue
    }

    /// Clone of the queue for handing to a commit worker.
    pub fn queue_snapshot(&self) -> ReviewQueue {
        self.queue.clone()
    }

    pub fn review_cursor(&self) -> usize {
        self.review_cursor
    }

    pub fn last_batch_failures(&self) -> usize {
        self.last_batch_failures
    }

    pub fn editing(&self) -> Option<EditTarget> {
        self.editing
    }

    // --- Phase transitions driven by key handling ---

    pub fn begin_scan(&mut self) {
        self.phase = Phase::Scanning;
        self.status = "Scanning folder...".to_string();
    }

    pub fn begin_suggest(&mut self) {
        self.phase = Phase::Suggesting;
        self.status = "Querying model...".to_string();
    }

    pub fn begin_batch(&mut self, total: usize) {
        self.phase = Phase::Batch {
            processed: 0,
            total,
            remaining: None,
        };
        self.status = format!("Suggesting tags for {total} images...");
    }

    pub fn begin_commit(&mut self, total: usize) {
        self.phase = Phase::Commit {
            attempted: 0,
            total,
        };
        self.status = format!("Writing tags to {total} files...");
    }

    /// Leaves the review screen, dropping its suggestions.
    pub fn close_review(&mut self) {
        self.queue = ReviewQueue::default();
        self.review_cursor = 0;
        self.editing = None;
        self.phase = Phase::Browse;
    }

    // --- Browse navigation ---

    pub fn next_image(&mut self) {
        self.session.next_image();
        self.tag_input.clear();
        self.status.clear();
    }

    pub fn prev_image(&mut self) {
        self.session.prev_image();
        self.tag_input.clear();
        self.status.clear();
    }

    // --- Review navigation and editing ---

    pub fn review_next(&mut self) {
        if self.review_cursor + 1 < self.queue.len() {
            self.review_cursor += 1;
        }
    }

    pub fn review_prev(&mut self) {
        if self.review_cursor > 0 {
            self.review_cursor -= 1;
        }
    }

    /// Toggles the acceptance flag of the selected record.
    pub fn toggle_selected_accepted(&mut self) {
        if let Some(record) = self.queue.records().get(self.review_cursor) {
            let flipped = !record.accepted;
            self.queue.set_accepted(self.review_cursor, flipped);
        }
    }

    /// Enters edit mode for `target`. Review editing requires a selected
    /// record to exist.
    pub fn start_editing(&mut self, target: EditTarget) {
        if target == EditTarget::ReviewTags && self.queue.is_empty() {
            return;
        }
        self.editing = Some(target);
    }

    pub fn stop_editing(&mut self) {
        self.editing = None;
    }

    pub fn push_edit_char(&mut self, c: char) {
        match self.editing {
            Some(EditTarget::BrowseTags) => self.tag_input.push(c),
            Some(EditTarget::ReviewTags) => {
                let cursor = self.review_cursor;
                if let Some(record) = self.queue.records().get(cursor) {
                    let mut tags = record.edited_tags.clone();
                    tags.push(c);
                    self.queue.edit_tags(cursor, tags);
                }
            }
            None => {}
        }
    }

    pub fn pop_edit_char(&mut self) {
        match self.editing {
            Some(EditTarget::BrowseTags) => {
                self.tag_input.pop();
            }
            Some(EditTarget::ReviewTags) => {
                let cursor = self.review_cursor;
                if let Some(record) = self.queue.records().get(cursor) {
                    let mut tags = record.edited_tags.clone();
                    tags.pop();
                    self.queue.edit_tags(cursor, tags);
                }
            }
            None => {}
        }
    }

    // --- Worker notifications ---

    /// Applies one notification from the background worker.
    pub fn on_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::ScanFinished(Ok(paths)) => {
                let count = paths.len();
                self.session.load_images(paths);
                self.tag_input.clear();
                self.phase = Phase::Browse;
                let est_minutes = count as f64 * EST_SECS_PER_IMAGE / 60.0;
                self.status =
                    format!("Loaded {count} images (~{est_minutes:.1} min to tag)");
            }
            WorkerEvent::ScanFinished(Err(e)) => {
                self.phase = Phase::Browse;
                self.status = e.to_string();
            }
            WorkerEvent::SuggestFinished { result, .. } => {
                self.phase = Phase::Browse;
                match result {
                    Ok(tags) => {
                        self.tag_input = tags;
                        self.status.clear();
                    }
                    Err(_) => {
                        self.status = "Failed to get suggestions.".to_string();
                    }
                }
            }
            WorkerEvent::BatchProgress(progress) => {
                let name = progress
                    .current
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let eta = match progress.remaining {
                    Some(d) => format!(" ~{}s left", d.as_secs()),
                    None => String::new(),
                };
                self.status = format!(
                    "Processing {name} ({}/{}){eta}",
                    progress.processed, progress.total
                );
                self.phase = Phase::Batch {
                    processed: progress.processed,
                    total: progress.total,
                    remaining: progress.remaining,
                };
            }
            WorkerEvent::BatchFinished(report) => {
                self.last_batch_failures = report.failures.len();
                self.queue = ReviewQueue::new(report.records);
                self.review_cursor = 0;
                self.phase = Phase::Review;
                self.status = if self.last_batch_failures > 0 {
                    format!(
                        "{} suggestion(s) failed; see error log",
                        self.last_batch_failures
                    )
                } else {
                    String::new()
                };
            }
            WorkerEvent::CommitProgress(progress) => {
                self.phase = Phase::Commit {
                    attempted: progress.attempted,
                    total: progress.total,
                };
            }
            WorkerEvent::CommitFinished(report) => {
                self.queue = ReviewQueue::default();
                self.review_cursor = 0;
                self.editing = None;
                self.phase = Phase::Browse;
                self.status = if report.failures.is_empty() {
                    format!("Images tagged: {} written", report.written)
                } else {
                    format!(
                        "Images tagged: {} written, {} failed (see error log)",
                        report.written,
                        report.failures.len()
                    )
                };
            }
        }
    }
}
