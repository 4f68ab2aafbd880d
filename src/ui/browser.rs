//! File browser overlay for opening scores.

use crate::app::App;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};
use ratatui::Frame;
use std::path::{Path, PathBuf};

use super::centered_rect;

/// Truncates a path string to fit within max_width, adding "..." prefix if needed.
#[inline]
fn truncate_path(path_str: &str, max_width: usize) -> String {
    if path_str.len() > max_width {
        format!(
            "...{}",
            &path_str[path_str.len().saturating_sub(max_width.saturating_sub(3))..]
        )
    } else {
        path_str.to_string()
    }
}

/// Extracts the display name from a path, returning "?" if extraction fails.
#[inline]
fn path_display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("?")
        .to_string()
}

/// Renders the file browser dialog overlay.
pub fn render_file_browser(frame: &mut Frame, app: &App) {
    if !app.file_browser.open {
        return;
    }

    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Open Score ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Current path
            Constraint::Length(1), // Separator
            Constraint::Min(5),    // File list
            Constraint::Length(1), // Instructions
        ])
        .split(inner);

    // Current directory
    let path_str = app.file_browser.current_dir.display().to_string();
    let max_width = chunks[0].width.saturating_sub(2) as usize;
    frame.render_widget(
        Paragraph::new(Span::styled(
            truncate_path(&path_str, max_width),
            Style::default().fg(Color::Cyan),
        )),
        chunks[0],
    );

    // File list
    let visible_height = chunks[2].height as usize;
    let start_idx = app.file_browser.scroll;
    let end_idx = (start_idx + visible_height).min(app.file_browser.entries.len());

    let items: Vec<ListItem> = if app.file_browser.entries.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No MusicXML files found in this directory",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )))]
    } else {
        app.file_browser.entries[start_idx..end_idx]
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let idx = start_idx + i;
                let is_selected = idx == app.file_browser.selected;

                let (icon, name, style) = if path == &PathBuf::from("..") {
                    (
                        "[..]",
                        "Parent Directory".to_string(),
                        Style::default().fg(Color::Blue),
                    )
                } else if path.is_dir() {
                    ("[D]", path_display_name(path), Style::default().fg(Color::Blue))
                } else {
                    (
                        "[XML]",
                        path_display_name(path),
                        Style::default().fg(Color::Green),
                    )
                };

                let display_style = if is_selected {
                    style.add_modifier(Modifier::REVERSED)
                } else {
                    style
                };

                ListItem::new(Line::from(vec![
                    Span::styled(format!("{} ", icon), Style::default().fg(Color::DarkGray)),
                    Span::styled(name, display_style),
                ]))
            })
            .collect()
    };

    frame.render_widget(List::new(items), chunks[2]);

    // Instructions
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("[Up/Down]", Style::default().fg(Color::Yellow)),
            Span::styled(" Navigate  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[Enter]", Style::default().fg(Color::Yellow)),
            Span::styled(" Open  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[Esc]", Style::default().fg(Color::Yellow)),
            Span::styled(" Cancel", Style::default().fg(Color::DarkGray)),
        ])),
        chunks[3],
    );
}
