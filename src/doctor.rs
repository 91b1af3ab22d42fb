//! Health checks for pictag.
//!
//! Provides the `doctor` command functionality:
//! - Ollama connectivity and installed models
//! - ExifTool discovery and version probe
//! - Error log writability

use anyhow::Result;

use crate::config::Config;
use crate::errlog::ErrorLog;
use crate::exiftool::ExifToolWriter;
use crate::ollama::OllamaClientBuilder;

// ANSI color codes for terminal output
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Health status for a component.
#[derive(Debug, Clone)]
pub enum HealthStatus {
    /// Component is healthy
    Ok,
    /// Component has a warning but is functional
    Warning(String),
    /// Component is not functional
    Error(String),
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, HealthStatus::Ok)
    }
}

/// Ollama connectivity information.
#[derive(Debug)]
pub struct OllamaHealth {
    pub status: HealthStatus,
    pub base_url: String,
    pub models: Vec<String>,
}

/// ExifTool discovery information.
#[derive(Debug)]
pub struct ExifToolHealth {
    pub status: HealthStatus,
    pub path: Option<String>,
    pub version: Option<String>,
}

/// Error-log information.
#[derive(Debug)]
pub struct LogHealth {
    pub status: HealthStatus,
    pub path: String,
}

/// Performs all health checks and prints results.
pub fn run_health_checks(config: &Config) -> Result<()> {
    let ollama = check_ollama_health(config);
    let exiftool = check_exiftool_health(config);
    let log = check_log_health(config);

    print_health_report(config, &ollama, &exiftool, &log);

    Ok(())
}

fn check_ollama_health(config: &Config) -> OllamaHealth {
    let mut builder = OllamaClientBuilder::new();
    if let Some(host) = &config.ollama_host {
        builder = builder.base_url(host.clone());
    }

    let client = match builder.build() {
        Ok(c) => c,
        Err(e) => {
            return OllamaHealth {
                status: HealthStatus::Error(format!("Failed to build client: {}", e)),
                base_url: String::new(),
                models: Vec::new(),
            };
        }
    };

    let base_url = client.base_url().to_string();

    match client.list_models() {
        Ok(models) => OllamaHealth {
            status: if models.is_empty() {
                HealthStatus::Warning("No models installed".to_string())
            } else if !models.iter().any(|m| m == &config.model) {
                HealthStatus::Warning(format!("Model '{}' not installed", config.model))
            } else {
                HealthStatus::Ok
            },
            base_url,
            models,
        },
        Err(e) => OllamaHealth {
            status: HealthStatus::Error(format!("Connection failed: {}", e)),
            base_url,
            models: Vec::new(),
        },
    }
}

fn check_exiftool_health(config: &Config) -> ExifToolHealth {
    let located = config.exiftool.clone().or_else(ExifToolWriter::locate);

    let Some(path) = located else {
        return ExifToolHealth {
            status: HealthStatus::Error(
                "Not found; set PICTAG_EXIFTOOL or install exiftool on PATH".to_string(),
            ),
            path: None,
            version: None,
        };
    };

    let writer = ExifToolWriter::new(&path);
    match writer.version() {
        Ok(version) => ExifToolHealth {
            status: HealthStatus::Ok,
            path: Some(path.display().to_string()),
            version: Some(version),
        },
        Err(e) => ExifToolHealth {
            status: HealthStatus::Error(format!("Located but not runnable: {}", e)),
            path: Some(path.display().to_string()),
            version: None,
        },
    }
}

fn check_log_health(config: &Config) -> LogHealth {
    let path = config.log_path.display().to_string();
    match ErrorLog::new(&config.log_path) {
        Ok(_) => LogHealth {
            status: HealthStatus::Ok,
            path,
        },
        Err(e) => LogHealth {
            status: HealthStatus::Error(format!("Not writable: {}", e)),
            path,
        },
    }
}

fn status_symbol(status: &HealthStatus) -> &'static str {
    match status {
        HealthStatus::Ok => "\u{2713}",
        HealthStatus::Warning(_) => "!",
        HealthStatus::Error(_) => "\u{2717}",
    }
}

fn status_color(status: &HealthStatus) -> &'static str {
    match status {
        HealthStatus::Ok => GREEN,
        HealthStatus::Warning(_) => YELLOW,
        HealthStatus::Error(_) => RED,
    }
}

fn print_health_report(
    config: &Config,
    ollama: &OllamaHealth,
    exiftool: &ExifToolHealth,
    log: &LogHealth,
) {
    println!("{}pictag doctor{}", BOLD, RESET);
    println!();

    // Ollama section
    println!("{}Ollama{}", BOLD, RESET);
    let status_text = match &ollama.status {
        HealthStatus::Ok => "Connected".to_string(),
        HealthStatus::Warning(w) => w.clone(),
        HealthStatus::Error(e) => e.clone(),
    };
    println!(
        "  {}{}{} Status: {}",
        status_color(&ollama.status),
        status_symbol(&ollama.status),
        RESET,
        status_text
    );
    if !ollama.base_url.is_empty() {
        println!("    {}URL: {}{}", DIM, ollama.base_url, RESET);
    }
    println!("    {}Model: {}{}", DIM, config.model, RESET);
    if !ollama.models.is_empty() {
        let models_display = if ollama.models.len() > 3 {
            format!(
                "{}, ... ({} more)",
                ollama.models[..3].join(", "),
                ollama.models.len() - 3
            )
        } else {
            ollama.models.join(", ")
        };
        println!("    {}Installed: {}{}", DIM, models_display, RESET);
    }
    println!();

    // ExifTool section
    println!("{}ExifTool{}", BOLD, RESET);
    let status_text = match &exiftool.status {
        HealthStatus::Ok => format!(
            "Version {}",
            exiftool.version.as_deref().unwrap_or("unknown")
        ),
        HealthStatus::Warning(w) => w.clone(),
        HealthStatus::Error(e) => e.clone(),
    };
    println!(
        "  {}{}{} Status: {}",
        status_color(&exiftool.status),
        status_symbol(&exiftool.status),
        RESET,
        status_text
    );
    if let Some(path) = &exiftool.path {
        println!("    {}Path: {}{}", DIM, path, RESET);
    }
    println!();

    // Error log section
    println!("{}Error log{}", BOLD, RESET);
    println!(
        "  {}{}{} {}",
        status_color(&log.status),
        status_symbol(&log.status),
        RESET,
        if log.status.is_ok() {
            "Writable"
        } else {
            "FAILED"
        }
    );
    println!("    {}Path: {}{}", DIM, log.path, RESET);
    if let HealthStatus::Error(e) = &log.status {
        println!("    {}{}{}", DIM, e, RESET);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_config(dir: &std::path::Path) -> Config {
        Config {
            model: "qwen2.5vl:7b".to_string(),
            ollama_host: None,
            exiftool: None,
            log_path: dir.join("errors.log"),
        }
    }

    #[test]
    fn health_status_is_ok() {
        assert!(HealthStatus::Ok.is_ok());
        assert!(!HealthStatus::Warning("test".into()).is_ok());
        assert!(!HealthStatus::Error("test".into()).is_ok());
    }

    #[test]
    fn log_check_passes_for_writable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let health = check_log_health(&config);
        assert!(health.status.is_ok());
    }

    #[test]
    fn exiftool_check_reports_unrunnable_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.exiftool = Some(PathBuf::from("/nonexistent/exiftool-binary"));

        let health = check_exiftool_health(&config);
        assert!(!health.status.is_ok());
        assert!(health.version.is_none());
    }
}
