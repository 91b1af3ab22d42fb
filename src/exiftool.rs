//! ExifTool write adapter.
//!
//! Wraps one external `exiftool` invocation per metadata write. The write
//! overwrites the keyword field and the file in place (`-overwrite_original`,
//! no backup copy is retained) with UTF-8 encoding. Any launch failure or
//! nonzero exit becomes a `WriteError`; nothing panics past this boundary.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Errors that can occur when writing metadata through ExifTool.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The executable could not be launched at all.
    #[error("failed to launch {}: {source}", .program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but reported failure.
    #[error("exiftool exited with {status} for {}: {stderr}", .path.display())]
    Failed {
        path: PathBuf,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Trait for the single-file keyword write.
///
/// Enables mocking the external process in tests and keeps the commit loop
/// independent of process plumbing.
pub trait KeywordWriter: Send + Sync {
    /// Writes `tags` into the keyword metadata field of `path`, overwriting
    /// the file in place.
    fn write_keywords(&self, path: &Path, tags: &str) -> Result<(), WriteError>;
}

/// Keyword writer backed by the external `exiftool` executable.
pub struct ExifToolWriter {
    program: PathBuf,
}

impl ExifToolWriter {
    /// Creates a writer using a known executable path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Attempts to locate the `exiftool` executable.
    ///
    /// Checks the `PICTAG_EXIFTOOL` and `EXIFTOOL` environment variables,
    /// then searches each `PATH` entry for `exiftool` / `exiftool.exe`.
    /// Returns `None` when nothing is found; write operations stay disabled
    /// until the operator points the tool at an executable.
    pub fn locate() -> Option<PathBuf> {
        for var in ["PICTAG_EXIFTOOL", "EXIFTOOL"] {
            if let Ok(value) = env::var(var)
                && !value.is_empty()
            {
                let candidate = PathBuf::from(value);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }

        let path_var = env::var_os("PATH")?;
        for dir in env::split_paths(&path_var) {
            for name in ["exiftool", "exiftool.exe"] {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Runs `exiftool -ver` and returns the reported version string.
    ///
    /// Used by the doctor command to confirm the located executable actually
    /// answers.
    pub fn version(&self) -> Result<String, WriteError> {
        let output = Command::new(&self.program)
            .arg("-ver")
            .output()
            .map_err(|source| WriteError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(WriteError::Failed {
                path: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl KeywordWriter for ExifToolWriter {
    fn write_keywords(&self, path: &Path, tags: &str) -> Result<(), WriteError> {
        let output = Command::new(&self.program)
            .arg("-overwrite_original")
            .arg("-codedcharacterset=utf8")
            .arg(format!("-XPKeywords={tags}"))
            .arg(path)
            .output()
            .map_err(|source| WriteError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(WriteError::Failed {
                path: path.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}
