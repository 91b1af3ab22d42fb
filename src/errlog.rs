//! Persistent append-only error log.
//!
//! Every adapter failure lands here as one timestamped line. The file is
//! never rotated or truncated by this tool.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use time::macros::format_description;

/// Append-only log of per-item failures.
///
/// Safe to share across threads; each append opens the file in append mode
/// so concurrent writers from the interactive thread and the worker cannot
/// clobber each other's lines.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    /// Creates a log handle for `path`, creating parent directories.
    ///
    /// The file itself is created lazily on first append.
    pub fn new(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    /// Returns the log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line: `[YYYY-MM-DD HH:MM:SS] message`.
    ///
    /// Stamped with local time; falls back to UTC when the local offset
    /// cannot be determined.
    pub fn append(&self, message: &str) -> std::io::Result<()> {
        let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let timestamp = now
            .format(&format)
            .unwrap_or_else(|_| "????-??-?? ??:??:??".to_string());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "[{timestamp}] {message}")
    }
}
