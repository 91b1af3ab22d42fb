//! Review and commit stage.
//!
//! Holds the suggestion records produced by a batch run while the operator
//! inspects them. Each record's acceptance flag and tag text are editable
//! independently. Committing writes the (re-normalized) tag text into the
//! files through the keyword writer, best-effort: one failing write is
//! logged and skipped, the loop continues, and nothing already written is
//! rolled back.

use std::path::PathBuf;

use crate::batch::SuggestionRecord;
use crate::errlog::ErrorLog;
use crate::exiftool::KeywordWriter;
use crate::normalizer::TagNormalizer;

/// Progress update emitted after each attempted write.
#[derive(Debug, Clone)]
pub struct CommitProgress {
    /// Writes attempted so far (successes and failures both count).
    pub attempted: usize,
    /// Total writes this commit will attempt.
    pub total: usize,
    /// The item that was just written (or failed).
    pub current: PathBuf,
}

/// A single write that failed during a commit.
#[derive(Debug, Clone)]
pub struct CommitFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one commit pass.
#[derive(Debug, Default)]
pub struct CommitReport {
    /// Files whose metadata was successfully overwritten.
    pub written: usize,
    pub failures: Vec<CommitFailure>,
}

impl CommitReport {
    pub fn attempted(&self) -> usize {
        self.written + self.failures.len()
    }
}

/// The batch's suggestions, held for inspection and commit.
#[derive(Debug, Clone, Default)]
pub struct ReviewQueue {
    records: Vec<SuggestionRecord>,
}

impl ReviewQueue {
    pub fn new(records: Vec<SuggestionRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SuggestionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the batch produced nothing to review (every item failed).
    /// Commits over an empty queue are valid and write nothing.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Toggles whether the record at `index` participates in
    /// `apply_selected`. Out-of-range indexes are ignored.
    pub fn set_accepted(&mut self, index: usize, accepted: bool) {
        if let Some(record) = self.records.get_mut(index) {
            record.accepted = accepted;
        }
    }

    /// Replaces the editable tag text of the record at `index`. The
    /// acceptance flag is untouched; editing never implies accepting.
    pub fn edit_tags(&mut self, index: usize, tags: impl Into<String>) {
        if let Some(record) = self.records.get_mut(index) {
            record.edited_tags = tags.into();
        }
    }

    /// Commits only the records whose acceptance flag is set.
    pub fn apply_selected(
        &self,
        writer: &dyn KeywordWriter,
        log: &ErrorLog,
        on_progress: impl FnMut(CommitProgress),
    ) -> CommitReport {
        let targets: Vec<&SuggestionRecord> =
            self.records.iter().filter(|r| r.accepted).collect();
        Self::commit(&targets, writer, log, on_progress)
    }

    /// Commits every record regardless of its acceptance flag.
    pub fn apply_all(
        &self,
        writer: &dyn KeywordWriter,
        log: &ErrorLog,
        on_progress: impl FnMut(CommitProgress),
    ) -> CommitReport {
        let targets: Vec<&SuggestionRecord> = self.records.iter().collect();
        Self::commit(&targets, writer, log, on_progress)
    }

    /// Shared commit loop.
    ///
    /// Walks `targets` in original order. The current tag text is free-form
    /// user input by now, so it is re-normalized before each write rather
    /// than trusted. Failures are logged and skipped; the report carries
    /// them for inspection. Completion is reported regardless of how many
    /// items failed.
    fn commit(
        targets: &[&SuggestionRecord],
        writer: &dyn KeywordWriter,
        log: &ErrorLog,
        mut on_progress: impl FnMut(CommitProgress),
    ) -> CommitReport {
        let total = targets.len();
        let mut report = CommitReport::default();

        for (index, record) in targets.iter().enumerate() {
            let tags = TagNormalizer::normalize(&record.edited_tags);

            match writer.write_keywords(&record.path, &tags) {
                Ok(()) => report.written += 1,
                Err(e) => {
                    let name = record
                        .path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| record.path.display().to_string());
                    let _ = log.append(&format!("Metadata write failed for {name}: {e}"));
                    report.failures.push(CommitFailure {
                        path: record.path.clone(),
                        reason: e.to_string(),
                    });
                }
            }

            on_progress(CommitProgress {
                attempted: index + 1,
                total,
                current: record.path.clone(),
            });
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exiftool::WriteError;
    use crate::thumbs::Thumbnail;
    use std::path::Path;
    use std::sync::Mutex;

    fn record(name: &str, tags: &str) -> SuggestionRecord {
        SuggestionRecord::new(PathBuf::from(name), tags.to_string(), Thumbnail::default())
    }

    /// Writer that records every invocation and fails for listed paths.
    struct ScriptedWriter {
        calls: Mutex<Vec<(PathBuf, String)>>,
        fail_for: Vec<PathBuf>,
    }

    impl ScriptedWriter {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_for: Vec::new(),
            }
        }

        fn failing_for(paths: &[&str]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_for: paths.iter().map(PathBuf::from).collect(),
            }
        }

        fn calls(&self) -> Vec<(PathBuf, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl KeywordWriter for ScriptedWriter {
        fn write_keywords(&self, path: &Path, tags: &str) -> Result<(), WriteError> {
            self.calls
                .lock()
                .unwrap()
                .push((path.to_path_buf(), tags.to_string()));
            if self.fail_for.iter().any(|p| p == path) {
                return Err(WriteError::Launch {
                    program: PathBuf::from("exiftool"),
                    source: std::io::Error::other("scripted failure"),
                });
            }
            Ok(())
        }
    }

    fn test_log() -> (tempfile::TempDir, ErrorLog) {
        let dir = tempfile::tempdir().unwrap();
        let log = ErrorLog::new(dir.path().join("errors.log")).unwrap();
        (dir, log)
    }

    #[test]
    fn apply_selected_writes_only_accepted_records_in_order() {
        let mut queue = ReviewQueue::new(vec![
            record("a.jpg", "cat"),
            record("b.jpg", "dog"),
            record("c.jpg", "bird"),
        ]);
        queue.set_accepted(1, false);

        let writer = ScriptedWriter::new();
        let (_dir, log) = test_log();
        let report = queue.apply_selected(&writer, &log, |_| {});

        let calls = writer.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, PathBuf::from("a.jpg"));
        assert_eq!(calls[1].0, PathBuf::from("c.jpg"));
        assert_eq!(report.written, 2);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn apply_all_ignores_acceptance_flags() {
        let mut queue = ReviewQueue::new(vec![record("a.jpg", "cat"), record("b.jpg", "dog")]);
        queue.set_accepted(0, false);
        queue.set_accepted(1, false);

        let writer = ScriptedWriter::new();
        let (_dir, log) = test_log();
        let report = queue.apply_all(&writer, &log, |_| {});

        assert_eq!(writer.calls().len(), 2);
        assert_eq!(report.written, 2);
    }

    #[test]
    fn write_failure_does_not_block_later_items() {
        let queue = ReviewQueue::new(vec![
            record("a.jpg", "cat"),
            record("b.jpg", "dog"),
            record("c.jpg", "bird"),
        ]);

        let writer = ScriptedWriter::failing_for(&["b.jpg"]);
        let (_dir, log) = test_log();
        let report = queue.apply_selected(&writer, &log, |_| {});

        // All three attempted, c.jpg written despite b.jpg failing.
        assert_eq!(writer.calls().len(), 3);
        assert_eq!(report.written, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, PathBuf::from("b.jpg"));
        assert_eq!(report.attempted(), 3);

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert!(content.contains("Metadata write failed for b.jpg"));
    }

    #[test]
    fn edited_tags_are_renormalized_before_write() {
        let mut queue = ReviewQueue::new(vec![record("a.jpg", "cat")]);
        queue.edit_tags(0, "Cat,, cat ; CAT, window ");

        let writer = ScriptedWriter::new();
        let (_dir, log) = test_log();
        queue.apply_selected(&writer, &log, |_| {});

        assert_eq!(writer.calls()[0].1, "Cat; window");
    }

    #[test]
    fn editing_tags_does_not_change_acceptance() {
        let mut queue = ReviewQueue::new(vec![record("a.jpg", "cat")]);
        queue.set_accepted(0, false);
        queue.edit_tags(0, "something else");
        assert!(!queue.records()[0].accepted);
    }

    #[test]
    fn empty_queue_commits_nothing_and_reports_completion() {
        let queue = ReviewQueue::new(Vec::new());
        let writer = ScriptedWriter::new();
        let (_dir, log) = test_log();

        let mut progress_calls = 0;
        let report = queue.apply_all(&writer, &log, |_| progress_calls += 1);

        assert!(queue.is_empty());
        assert!(writer.calls().is_empty());
        assert_eq!(report.written, 0);
        assert_eq!(progress_calls, 0);
    }

    #[test]
    fn progress_is_emitted_per_attempted_item() {
        let queue = ReviewQueue::new(vec![record("a.jpg", "x"), record("b.jpg", "y")]);
        let writer = ScriptedWriter::failing_for(&["a.jpg"]);
        let (_dir, log) = test_log();

        let mut seen = Vec::new();
        queue.apply_all(&writer, &log, |p| seen.push((p.attempted, p.total)));

        assert_eq!(seen, vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn out_of_range_edits_are_ignored() {
        let mut queue = ReviewQueue::new(vec![record("a.jpg", "cat")]);
        queue.set_accepted(5, false);
        queue.edit_tags(5, "nothing");
        assert!(queue.records()[0].accepted);
        assert_eq!(queue.records()[0].edited_tags, "cat");
    }
}
