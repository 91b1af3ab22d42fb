//! Integration tests for the batch suggestion pipeline.
//!
//! Drives `BatchPipeline` over real image files in a temp directory with a
//! mock suggestion client, so the full read -> suggest -> normalize ->
//! thumbnail path runs without a model server.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{Rgb, RgbImage};
use pictag::ErrorLog;
use pictag::batch::BatchPipeline;
use pictag::ollama::{OllamaError, SuggestionClient};

/// Writes a small valid PNG so thumbnail rendering succeeds.
fn write_image(dir: &Path, name: &str) -> PathBuf {
    let mut img = RgbImage::new(8, 8);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgb([x as u8 * 30, y as u8 * 30, 64]);
    }
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

/// Client that answers from a fixed script, failing where the script says
/// so, and records the prompt it was handed.
struct ScriptedClient {
    replies: Vec<Result<String, String>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl SuggestionClient for ScriptedClient {
    fn suggest(&self, _model: &str, prompt: &str, _image: &[u8]) -> Result<String, OllamaError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(index) {
            Some(Ok(reply)) => Ok(reply.clone()),
            Some(Err(message)) => Err(OllamaError::Api {
                message: message.clone(),
            }),
            None => panic!("more calls than scripted replies"),
        }
    }
}

fn pipeline_fixture(
    dir: &Path,
    replies: Vec<Result<String, String>>,
) -> (BatchPipeline, ErrorLog) {
    let log = ErrorLog::new(dir.join("errors.log")).unwrap();
    let client = std::sync::Arc::new(ScriptedClient::new(replies));
    (BatchPipeline::new(client, log.clone()), log)
}

#[test]
fn one_failing_item_does_not_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<PathBuf> = (1..=5)
        .map(|i| write_image(dir.path(), &format!("img{i}.png")))
        .collect();

    let (pipeline, log) = pipeline_fixture(
        dir.path(),
        vec![
            Ok("one".to_string()),
            Ok("two".to_string()),
            Err("connection reset".to_string()),
            Ok("four".to_string()),
            Ok("five".to_string()),
        ],
    );

    let report = pipeline.run(&paths, "test-model", |_| {});

    // Four records in original relative order: items 1, 2, 4, 5.
    assert_eq!(report.records.len(), 4);
    assert_eq!(report.records[0].path, paths[0]);
    assert_eq!(report.records[1].path, paths[1]);
    assert_eq!(report.records[2].path, paths[3]);
    assert_eq!(report.records[3].path, paths[4]);

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, paths[2]);
    assert!(report.failures[0].reason.contains("connection reset"));

    // Exactly one log line, naming the failed file.
    let content = std::fs::read_to_string(log.path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Suggestion failed for img3.png"));
}

#[test]
fn suggestions_are_normalized_into_records() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![write_image(dir.path(), "photo.png")];

    let (pipeline, _log) = pipeline_fixture(
        dir.path(),
        vec![Ok("Cat, cat; naïve,  beach ".to_string())],
    );

    let report = pipeline.run(&paths, "test-model", |_| {});

    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.tags, "Cat; naive; beach");
    assert!(record.accepted);
    assert_eq!(record.edited_tags, record.tags);
    assert!(record.thumbnail.width() > 0);
}

#[test]
fn every_item_failing_is_a_valid_empty_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<PathBuf> = (1..=3)
        .map(|i| write_image(dir.path(), &format!("img{i}.png")))
        .collect();

    let (pipeline, log) = pipeline_fixture(
        dir.path(),
        vec![
            Err("down".to_string()),
            Err("down".to_string()),
            Err("down".to_string()),
        ],
    );

    let report = pipeline.run(&paths, "test-model", |_| {});

    assert!(report.records.is_empty());
    assert_eq!(report.failures.len(), 3);

    let content = std::fs::read_to_string(log.path()).unwrap();
    assert_eq!(content.lines().count(), 3);
}

#[test]
fn progress_is_ordered_and_estimate_appears_from_third_sample() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<PathBuf> = (1..=5)
        .map(|i| write_image(dir.path(), &format!("img{i}.png")))
        .collect();

    let (pipeline, _log) = pipeline_fixture(
        dir.path(),
        (0..5).map(|i| Ok(format!("tag{i}"))).collect(),
    );

    let mut updates = Vec::new();
    pipeline.run(&paths, "test-model", |p| updates.push(p));

    assert_eq!(updates.len(), 5);
    for (i, update) in updates.iter().enumerate() {
        assert_eq!(update.processed, i + 1);
        assert_eq!(update.total, 5);
        assert_eq!(update.current, paths[i]);
    }

    // Insufficient data for the first two items, an estimate afterwards.
    assert!(updates[0].remaining.is_none());
    assert!(updates[1].remaining.is_none());
    for update in &updates[2..] {
        assert!(update.remaining.is_some());
    }
}

#[test]
fn unreadable_image_is_logged_and_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_image(dir.path(), "good.png");
    let missing = dir.path().join("missing.png");
    let paths = vec![missing.clone(), good.clone()];

    // Only the readable image reaches the client.
    let (pipeline, log) = pipeline_fixture(dir.path(), vec![Ok("fine".to_string())]);

    let report = pipeline.run(&paths, "test-model", |_| {});

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].path, good);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, missing);

    let content = std::fs::read_to_string(log.path()).unwrap();
    assert!(content.contains("missing.png"));
}

#[test]
fn fixed_prompt_is_sent_with_every_request() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write_image(dir.path(), "a.png"),
        write_image(dir.path(), "b.png"),
    ];

    let log = ErrorLog::new(dir.path().join("errors.log")).unwrap();
    let client = std::sync::Arc::new(ScriptedClient::new(vec![
        Ok("x".to_string()),
        Ok("y".to_string()),
    ]));
    let pipeline = BatchPipeline::new(client.clone(), log);

    pipeline.run(&paths, "test-model", |_| {});

    let prompts = client.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 2);
    for prompt in prompts.iter() {
        assert!(prompt.contains("comma-separated list of 5-10 relevant"));
        assert_eq!(prompt, &prompts[0]);
    }
}
