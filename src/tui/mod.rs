//! Terminal user interface for pictag.
//!
//! A two-screen TUI (browse and review) over the suggestion and commit
//! pipelines, using ratatui for rendering and crossterm for terminal
//! management. All network and process work runs on the background worker;
//! the loop here only drains its event channel between frames, so the
//! interactive thread never blocks on a model call or an ExifTool launch.

use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{Context, Result};
use crossterm::{
    event::{self as crossterm_event, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

mod app;
pub mod event;
mod ui;

pub use app::{App, EditTarget, Phase};

use crate::batch::{BatchPipeline, SuggestionRecord};
use crate::config::Config;
use crate::errlog::ErrorLog;
use crate::exiftool::ExifToolWriter;
use crate::ollama::{OllamaClientBuilder, SuggestionClient};
use crate::review::ReviewQueue;
use crate::session::Session;
use crate::thumbs::Thumbnail;
use crate::worker::{CommitMode, Worker, WorkerEvent};
use event::Command;

/// Everything the event loop needs to dispatch background work.
struct Runtime {
    worker: Worker,
    tx: Sender<WorkerEvent>,
    rx: Receiver<WorkerEvent>,
    client: Arc<dyn SuggestionClient>,
    log: ErrorLog,
    folder: PathBuf,
}

/// Initializes the terminal for TUI rendering.
fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// Must run before exiting, even on error paths, to avoid leaving the
/// terminal in raw mode.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// Minimal terminal restoration for the panic handler.
fn restore_terminal_panic() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Installs a panic hook that restores the terminal before panicking.
fn init_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal_panic();
        original_hook(panic_info);
    }));
}

/// Entry point for the interactive application.
///
/// Builds the Ollama client, resolves ExifTool, kicks off the initial
/// folder scan on the worker, and runs the event loop until quit.
pub fn run(config: &Config, folder: PathBuf) -> Result<()> {
    init_panic_hook();

    let log = ErrorLog::new(&config.log_path).with_context(|| {
        format!("failed to prepare error log at {}", config.log_path.display())
    })?;

    let mut builder = OllamaClientBuilder::new();
    if let Some(host) = &config.ollama_host {
        builder = builder.base_url(host.clone());
    }
    let client: Arc<dyn SuggestionClient> =
        Arc::new(builder.build().context("failed to build Ollama client")?);

    let exiftool = config.exiftool.clone().or_else(ExifToolWriter::locate);

    let mut session = Session::new(config.model.clone());
    session.set_exiftool(exiftool);

    let mut app = App::new(session);
    if !app.session().can_write() {
        app.set_status("ExifTool not found; writes disabled (set PICTAG_EXIFTOOL)");
    }

    let (tx, rx) = mpsc::channel();
    let mut runtime = Runtime {
        worker: Worker::new(),
        tx,
        rx,
        client,
        log,
        folder,
    };

    app.begin_scan();
    runtime
        .worker
        .spawn_scan(runtime.folder.clone(), runtime.tx.clone())
        .expect("fresh worker cannot be busy");

    let mut terminal = init_terminal()?;
    let result = run_event_loop(&mut app, &mut runtime, &mut terminal);

    if let Err(e) = restore_terminal(&mut terminal) {
        eprintln!("Error restoring terminal: {e}");
    }

    result
}

fn run_event_loop(
    app: &mut App,
    runtime: &mut Runtime,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    loop {
        // Apply pending worker notifications before drawing so progress is
        // never a frame behind. Events arrive in production order.
        while let Ok(event) = runtime.rx.try_recv() {
            app.on_worker_event(event);
        }

        terminal.draw(|frame| {
            ui::draw(frame, app);
        })?;

        if crossterm_event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = crossterm_event::read()?
        {
            match event::handle_key_event(app, key) {
                Some(Command::Quit) => break,
                Some(command) => dispatch(app, runtime, command),
                None => {}
            }
        }
    }

    Ok(())
}

/// Executes a key-handler command, spawning background work as needed.
///
/// Precondition failures (no images, writer missing, worker busy) become
/// status-line messages; nothing here blocks or panics.
fn dispatch(app: &mut App, runtime: &mut Runtime, command: Command) {
    if runtime.worker.is_busy() {
        app.set_status("A background task is already running");
        return;
    }

    match command {
        Command::Quit => {}
        Command::Rescan => {
            app.begin_scan();
            let _ = runtime
                .worker
                .spawn_scan(runtime.folder.clone(), runtime.tx.clone());
        }
        Command::SuggestCurrent => {
            let Some(path) = app.session().current_image().map(PathBuf::from) else {
                app.set_status("No images loaded.");
                return;
            };
            let model = app.session().model().to_string();
            app.begin_suggest();
            let _ = runtime.worker.spawn_suggest(
                runtime.client.clone(),
                runtime.log.clone(),
                path,
                model,
                runtime.tx.clone(),
            );
        }
        Command::SaveCurrent => {
            let Some(exiftool) = app.session().exiftool().map(PathBuf::from) else {
                app.set_status("ExifTool path not set.");
                return;
            };
            let Some(path) = app.session().current_image().map(PathBuf::from) else {
                app.set_status("No images loaded.");
                return;
            };
            let tags = app.tag_input().trim().to_string();
            if tags.is_empty() {
                app.set_status("Enter tags before saving.");
                return;
            }

            // One-record queue reuses the shared commit loop (and its
            // re-normalization) for the single-image save.
            let queue = ReviewQueue::new(vec![SuggestionRecord::new(
                path,
                tags,
                Thumbnail::default(),
            )]);
            app.begin_commit(1);
            let _ = runtime.worker.spawn_commit(
                queue,
                CommitMode::All,
                Arc::new(ExifToolWriter::new(exiftool)),
                runtime.log.clone(),
                runtime.tx.clone(),
            );
        }
        Command::RunBatch => {
            if app.session().is_empty() {
                app.set_status("No images loaded.");
                return;
            }
            let paths = app.session().images().to_vec();
            let model = app.session().model().to_string();
            let pipeline = BatchPipeline::new(runtime.client.clone(), runtime.log.clone());
            app.begin_batch(paths.len());
            let _ = runtime
                .worker
                .spawn_batch(pipeline, paths, model, runtime.tx.clone());
        }
        Command::Commit(mode) => {
            let Some(exiftool) = app.session().exiftool().map(PathBuf::from) else {
                app.set_status("ExifTool path not set.");
                return;
            };
            let queue = app.queue_snapshot();
            let total = match mode {
                CommitMode::Selected => {
                    queue.records().iter().filter(|r| r.accepted).count()
                }
                CommitMode::All => queue.len(),
            };
            if total == 0 {
                app.set_status("Nothing to apply.");
                return;
            }
            app.begin_commit(total);
            let _ = runtime.worker.spawn_commit(
                queue,
                mode,
                Arc::new(ExifToolWriter::new(exiftool)),
                runtime.log.clone(),
                runtime.tx.clone(),
            );
        }
    }
}
