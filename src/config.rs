//! Runtime configuration.
//!
//! Values resolve in the usual order: explicit CLI flag, then environment
//! variable (a `.env` file is honored via dotenvy), then default.

use std::path::PathBuf;

use anyhow::Result;

/// Model used when neither flag nor environment names one.
pub const DEFAULT_MODEL: &str = "qwen2.5vl:7b";

/// Resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Model identifier sent with every suggestion request.
    pub model: String,
    /// Ollama base URL override; `None` lets the client builder resolve
    /// `OLLAMA_HOST` / its default.
    pub ollama_host: Option<String>,
    /// Explicit ExifTool executable; `None` triggers discovery.
    pub exiftool: Option<PathBuf>,
    /// Error log location.
    pub log_path: PathBuf,
}

impl Config {
    /// Resolves configuration from the environment.
    ///
    /// Reads `PICTAG_MODEL`, `OLLAMA_HOST`, `PICTAG_EXIFTOOL`, and
    /// `PICTAG_LOG`. The log defaults to `{data_dir}/pictag/errors.log`,
    /// falling back to `./pictag_errors.log` when no data directory can be
    /// determined.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let model = std::env::var("PICTAG_MODEL")
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let ollama_host = std::env::var("OLLAMA_HOST").ok().filter(|h| !h.is_empty());

        let exiftool = std::env::var("PICTAG_EXIFTOOL")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let log_path = std::env::var("PICTAG_LOG")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_log_path);

        Ok(Self {
            model,
            ollama_host,
            exiftool,
            log_path,
        })
    }

    /// Applies CLI flag overrides on top of the environment-resolved values.
    pub fn with_overrides(
        mut self,
        model: Option<String>,
        ollama_host: Option<String>,
        exiftool: Option<PathBuf>,
    ) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        if let Some(host) = ollama_host {
            self.ollama_host = Some(host);
        }
        if let Some(path) = exiftool {
            self.exiftool = Some(path);
        }
        self
    }
}

fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("pictag").join("errors.log"))
        .unwrap_or_else(|| PathBuf::from("pictag_errors.log"))
}
