//! Batch tag-suggestion pipeline.
//!
//! Walks an ordered list of image paths, requests a tag suggestion for each
//! from the vision model, normalizes the reply, renders a review thumbnail,
//! and collects the results. Items are processed strictly in input order and
//! one at a time; a local inference server handles one request well and
//! poorly tolerates a flood. A failed item is recorded and logged, never
//! fatal: a batch of N images always attempts all N.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::errlog::ErrorLog;
use crate::normalizer::TagNormalizer;
use crate::ollama::SuggestionClient;
use crate::thumbs::{self, THUMBNAIL_SIZE, Thumbnail};

/// Instruction prompt sent with every image.
pub const SUGGESTION_PROMPT: &str = "Generate a concise, comma-separated list of 5-10 relevant \
     keywords for metadata tagging. Avoid repetition or stylistic elaboration.";

/// Number of timing samples required before a remaining-time estimate is
/// emitted.
pub const MIN_TIMING_SAMPLES: usize = 3;

/// One reviewed suggestion: an image, its canonical tags, and the editable
/// state the review stage works on.
#[derive(Debug, Clone)]
pub struct SuggestionRecord {
    pub path: PathBuf,
    /// Canonical tag string as suggested by the model.
    pub tags: String,
    /// Small preview for the review list.
    pub thumbnail: Thumbnail,
    /// Whether this record participates in `apply_selected`. Defaults to
    /// true; only an explicit toggle changes it, never a tag edit.
    pub accepted: bool,
    /// Editable tag text, initialized from `tags`. Free-form user input;
    /// re-normalized at commit time.
    pub edited_tags: String,
}

impl SuggestionRecord {
    pub fn new(path: PathBuf, tags: String, thumbnail: Thumbnail) -> Self {
        let edited_tags = tags.clone();
        Self {
            path,
            tags,
            thumbnail,
            accepted: true,
            edited_tags,
        }
    }
}

/// A single item that failed during the batch run.
#[derive(Debug, Clone)]
pub struct ItemFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Progress update emitted after each processed item.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Items attempted so far (successes and failures both count).
    pub processed: usize,
    pub total: usize,
    /// The item that just finished.
    pub current: PathBuf,
    /// Projected remaining time, absent until enough samples exist.
    pub remaining: Option<Duration>,
}

/// Outcome of a full batch run.
///
/// Failures are collected here as values, not just log lines, so callers
/// and tests can inspect counts and causes. An empty `records` list (every
/// item failed) is a valid outcome.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<SuggestionRecord>,
    pub failures: Vec<ItemFailure>,
}

/// Remaining-time projection over per-item timing samples.
///
/// Uses a plain running average over every sample seen so far. No estimate
/// is produced before `MIN_TIMING_SAMPLES` samples exist.
#[derive(Debug, Default)]
pub struct EtaEstimator {
    samples: Vec<Duration>,
}

impl EtaEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one item's elapsed time.
    pub fn record(&mut self, elapsed: Duration) {
        self.samples.push(elapsed);
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Projects time remaining for `items_left` further items, rounded to
    /// whole seconds. Returns `None` while fewer than `MIN_TIMING_SAMPLES`
    /// samples exist.
    pub fn remaining(&self, items_left: usize) -> Option<Duration> {
        if self.samples.len() < MIN_TIMING_SAMPLES {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        let average = total.as_secs_f64() / self.samples.len() as f64;
        let seconds = (average * items_left as f64).round();
        Some(Duration::from_secs(seconds as u64))
    }
}

/// The batch suggestion pipeline.
pub struct BatchPipeline {
    client: Arc<dyn SuggestionClient>,
    log: ErrorLog,
    thumbnail_size: u32,
}

impl BatchPipeline {
    pub fn new(client: Arc<dyn SuggestionClient>, log: ErrorLog) -> Self {
        Self {
            client,
            log,
            thumbnail_size: THUMBNAIL_SIZE,
        }
    }

    /// Runs the pipeline over `paths` in order, invoking `on_progress` after
    /// each item.
    ///
    /// Every per-item failure is swallowed at the item boundary: it becomes
    /// an `ItemFailure` in the report plus one error-log line, and the run
    /// moves on to the next image. The elapsed time of failed items still
    /// feeds the estimate; a slow failing server should not make the
    /// projection optimistic.
    pub fn run(
        &self,
        paths: &[PathBuf],
        model: &str,
        mut on_progress: impl FnMut(BatchProgress),
    ) -> BatchReport {
        let total = paths.len();
        let mut report = BatchReport::default();
        let mut estimator = EtaEstimator::new();

        for (index, path) in paths.iter().enumerate() {
            let started = Instant::now();

            match self.suggest_one(path, model) {
                Ok(record) => report.records.push(record),
                Err(reason) => {
                    let message = format!("Suggestion failed for {}: {}", display_name(path), reason);
                    let _ = self.log.append(&message);
                    report.failures.push(ItemFailure {
                        path: path.clone(),
                        reason,
                    });
                }
            }

            estimator.record(started.elapsed());

            let processed = index + 1;
            on_progress(BatchProgress {
                processed,
                total,
                current: path.clone(),
                remaining: estimator.remaining(total - processed),
            });
        }

        report
    }

    /// Processes a single image end to end.
    fn suggest_one(&self, path: &Path, model: &str) -> Result<SuggestionRecord, String> {
        let bytes = std::fs::read(path).map_err(|e| format!("could not read file: {e}"))?;

        let raw = self
            .client
            .suggest(model, SUGGESTION_PROMPT, &bytes)
            .map_err(|e| e.to_string())?;

        let tags = TagNormalizer::normalize(&raw);

        let thumbnail = thumbs::render_thumbnail(path, self.thumbnail_size)
            .map_err(|e| format!("could not render preview: {e}"))?;

        Ok(SuggestionRecord::new(path.to_path_buf(), tags, thumbnail))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
