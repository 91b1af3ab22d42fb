use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pictag::Config;

/// pictag - AI-assisted image keyword tagging
#[derive(Parser)]
#[command(name = "pictag")]
#[command(about = "Suggest, review, and write image keyword tags with a local vision model")]
#[command(version)]
struct Cli {
    /// Folder of images to load
    #[arg(value_name = "FOLDER")]
    folder: Option<PathBuf>,

    /// Model identifier sent to Ollama (default: qwen2.5vl:7b)
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Ollama base URL (default: OLLAMA_HOST or http://localhost:11434)
    #[arg(long, value_name = "URL")]
    ollama_host: Option<String>,

    /// Path to the exiftool executable
    #[arg(long, value_name = "PATH")]
    exiftool: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Check Ollama, ExifTool, and error-log health
    Doctor,
}

fn main() {
    let cli = Cli::parse();

    let result = run(&cli);

    if let Err(e) = result {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::from_env()?.with_overrides(
        cli.model.clone(),
        cli.ollama_host.clone(),
        cli.exiftool.clone(),
    );

    match &cli.command {
        Some(Commands::Doctor) => pictag::doctor::run_health_checks(&config),
        None => {
            let folder = cli
                .folder
                .clone()
                .ok_or_else(|| anyhow::anyhow!("missing FOLDER argument (usage: pictag <FOLDER>)"))?;
            pictag::tui::run(&config, folder)
        }
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are bad invocations such as a missing folder argument;
/// internal errors are setup failures like an unwritable log location.
fn is_user_error(error: &anyhow::Error) -> bool {
    let error_msg = error.to_string();
    error_msg.contains("missing FOLDER")
}
