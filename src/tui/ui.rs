//! UI rendering functions for the TUI.
//!
//! Renders the browse and review screens plus a progress gauge for the
//! long-running phases, using ratatui widgets and layout management.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
};

use super::app::{App, EditTarget, Phase};

/// Main rendering function for the TUI.
pub fn draw(frame: &mut Frame, app: &App) {
    let size = frame.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Progress gauge / spacer
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Shortcut bar
        ])
        .split(size);

    match app.phase() {
        Phase::Review => render_review(frame, app, main_chunks[0]),
        // A commit launched from the review screen keeps that screen up;
        // the single-image save commits with an empty queue and stays on
        // the browse screen.
        Phase::Commit { .. } if !app.queue().is_empty() => {
            render_review(frame, app, main_chunks[0])
        }
        _ => render_browse(frame, app, main_chunks[0]),
    }

    render_progress(frame, app, main_chunks[1]);
    render_status(frame, app, main_chunks[2]);
    render_shortcut_bar(frame, app, main_chunks[3]);
}

/// Browse screen: image list on the left, current image and tag entry on
/// the right.
fn render_browse(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let session = app.session();

    let items: Vec<ListItem> = session
        .images()
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            ListItem::new(Line::from(name))
        })
        .collect();

    let title = format!("Images ({})", session.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::REVERSED),
        );

    let mut list_state = ListState::default();
    if !session.is_empty() {
        list_state.select(Some(session.cursor()));
    }
    frame.render_stateful_widget(list, chunks[0], &mut list_state);

    // Right panel: current image details over the tag entry.
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(chunks[1]);

    let detail = match session.current_image() {
        Some(path) => {
            let position = format!("{}/{}", session.cursor() + 1, session.len());
            vec![
                Line::from(vec![
                    Span::styled(
                        path.file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(position, Style::default().fg(Color::DarkGray)),
                ]),
                Line::from(Span::styled(
                    path.display().to_string(),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(""),
                Line::from(format!("Model: {}", session.model())),
                Line::from(match session.exiftool() {
                    Some(p) => format!("ExifTool: {}", p.display()),
                    None => "ExifTool: not found (writes disabled)".to_string(),
                }),
            ]
        }
        None => vec![Line::from("No images loaded")],
    };

    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title("Current"))
        .wrap(Wrap { trim: false });
    frame.render_widget(detail_widget, right[0]);

    let editing = app.editing() == Some(EditTarget::BrowseTags);
    let mut tags = app.tag_input().to_string();
    if editing {
        tags.push('█');
    }
    let border_style = if editing {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let tag_widget = Paragraph::new(tags).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Tags")
            .border_style(border_style),
    );
    frame.render_widget(tag_widget, right[1]);
}

/// Review screen: record list on the left, selected record's editable tags
/// on the right.
fn render_review(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let queue = app.queue();

    let items: Vec<ListItem> = queue
        .records()
        .iter()
        .map(|record| {
            let marker = if record.accepted { "[x]" } else { "[ ]" };
            let name = record
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::styled(
                    marker,
                    if record.accepted {
                        Style::default().fg(Color::Green)
                    } else {
                        Style::default().fg(Color::DarkGray)
                    },
                ),
                Span::raw(" "),
                Span::raw(name),
            ]))
        })
        .collect();

    let title = if queue.is_empty() {
        "Review (nothing to apply)".to_string()
    } else {
        format!("Review ({} suggestions)", queue.len())
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::REVERSED),
        );

    let mut list_state = ListState::default();
    if !queue.is_empty() {
        list_state.select(Some(app.review_cursor()));
    }
    frame.render_stateful_widget(list, chunks[0], &mut list_state);

    let detail = match queue.records().get(app.review_cursor()) {
        Some(record) => {
            let editing = app.editing() == Some(EditTarget::ReviewTags);
            let mut tags = record.edited_tags.clone();
            if editing {
                tags.push('█');
            }
            vec![
                Line::from(Span::styled(
                    record
                        .path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!(
                        "preview {}x{}",
                        record.thumbnail.width(),
                        record.thumbnail.height()
                    ),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(""),
                Line::from(tags),
            ]
        }
        None => vec![Line::from("Nothing to apply")],
    };

    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title("Tags"))
        .wrap(Wrap { trim: false });
    frame.render_widget(detail_widget, chunks[1]);
}

/// Progress gauge for batch and commit runs; empty spacer otherwise.
fn render_progress(frame: &mut Frame, app: &App, area: Rect) {
    let (label, ratio) = match app.phase() {
        Phase::Batch {
            processed, total, ..
        } => (
            format!("{processed}/{total}"),
            gauge_ratio(*processed, *total),
        ),
        Phase::Commit { attempted, total } => (
            format!("{attempted}/{total}"),
            gauge_ratio(*attempted, *total),
        ),
        _ => {
            frame.render_widget(Block::default(), area);
            return;
        }
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(ratio)
        .label(label);
    frame.render_widget(gauge, area);
}

fn gauge_ratio(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (done as f64 / total as f64).clamp(0.0, 1.0)
    }
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = Paragraph::new(app.status().to_string())
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(status, area);
}

fn render_shortcut_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = if app.editing().is_some() {
        "type to edit | Backspace delete | Enter/Esc done"
    } else {
        match app.phase() {
            Phase::Browse => {
                "h/l navigate | e edit | s suggest | w write | b batch | r rescan | q quit"
            }
            Phase::Review => {
                "j/k navigate | Space toggle | e edit | a apply selected | A apply all | Esc back | q quit"
            }
            _ => "q quit",
        }
    };

    let bar = Paragraph::new(shortcuts).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(bar, area);
}
