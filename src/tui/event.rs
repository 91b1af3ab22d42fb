//! Keyboard event handling for the TUI.
//!
//! Maps crossterm keyboard events to application state changes. Pure state
//! changes (navigation, toggles, editing) are applied directly; anything
//! that needs the background worker is returned as a `Command` for the
//! event loop to dispatch.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, EditTarget, Phase};
use crate::worker::CommitMode;

/// Work the event loop must dispatch to the background worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Re-scan the session folder.
    Rescan,
    /// Request tags for the image under the cursor.
    SuggestCurrent,
    /// Write the browse tag entry to the current image.
    SaveCurrent,
    /// Run the batch suggestion pipeline over all images.
    RunBatch,
    /// Commit the review queue.
    Commit(CommitMode),
}

/// Handles a keyboard event, mutating `app` and optionally returning a
/// command for the event loop.
///
/// # Key bindings
///
/// Browse: `h`/`Left` and `l`/`Right` navigate, `e` edits the tag entry,
/// `s` suggests tags for the current image, `w` writes them, `b` runs the
/// batch, `r` rescans, `q` quits.
///
/// Review: `j`/`k` navigate, `Space` toggles acceptance, `e` edits the
/// selected tags, `a` applies selected, `A` applies all, `Esc` discards.
///
/// While editing: characters and `Backspace` edit the buffer, `Enter` or
/// `Esc` leave edit mode. While a background run is in flight only `q` is
/// honored.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Command> {
    // Edit mode captures everything except its exit keys.
    if app.editing().is_some() {
        handle_edit_mode(app, key);
        return None;
    }

    // Quit works everywhere; a run in flight goes to completion, already
    // written files stay written.
    if key.code == KeyCode::Char('q') && key.modifiers.is_empty() {
        return Some(Command::Quit);
    }

    if app.is_running() {
        return None;
    }

    match app.phase() {
        Phase::Browse => handle_browse(app, key),
        Phase::Review => handle_review(app, key),
        _ => None,
    }
}

fn handle_edit_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => app.stop_editing(),
        KeyCode::Backspace => app.pop_edit_char(),
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            app.push_edit_char(c);
        }
        _ => {}
    }
}

fn handle_browse(app: &mut App, key: KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => {
            app.prev_image();
            None
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.next_image();
            None
        }
        KeyCode::Char('e') => {
            app.start_editing(EditTarget::BrowseTags);
            None
        }
        KeyCode::Char('s') => Some(Command::SuggestCurrent),
        KeyCode::Char('w') => Some(Command::SaveCurrent),
        KeyCode::Char('b') => Some(Command::RunBatch),
        KeyCode::Char('r') => Some(Command::Rescan),
        _ => None,
    }
}

fn handle_review(app: &mut App, key: KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            app.review_next();
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.review_prev();
            None
        }
        KeyCode::Char(' ') => {
            app.toggle_selected_accepted();
            None
        }
        KeyCode::Char('e') => {
            app.start_editing(EditTarget::ReviewTags);
            None
        }
        KeyCode::Char('a') => Some(Command::Commit(CommitMode::Selected)),
        KeyCode::Char('A') => Some(Command::Commit(CommitMode::All)),
        KeyCode::Esc => {
            app.close_review();
            None
        }
        _ => None,
    }
}
