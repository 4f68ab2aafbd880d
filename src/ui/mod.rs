//! Terminal user interface components.
//!
//! The layout is a transport bar, the score panel, and a key-hint line,
//! with the file browser as a modal overlay.

mod browser;
mod score_view;
mod transport;

use crate::app::App;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

pub use browser::render_file_browser;
pub use score_view::render_score;
pub use transport::render_transport;

/// Renders the complete UI layout.
///
/// - Top: transport with playback state, tempo readout, and status
/// - Center: the rendered score with the playback cursor
/// - Bottom: key hints
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Transport
            Constraint::Min(5),    // Score
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    render_transport(frame, chunks[0], app);
    render_score(frame, chunks[1], app);
    render_hints(frame, chunks[2], app);
}

/// The key-hint line at the bottom of the screen.
fn render_hints(frame: &mut Frame, area: Rect, app: &App) {
    let toggle_label = if app.is_playing() { " Stop  " } else { " Play  " };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("[Space]", Style::default().fg(Color::Yellow)),
            Span::styled(toggle_label, Style::default().fg(Color::DarkGray)),
            Span::styled("[o]", Style::default().fg(Color::Yellow)),
            Span::styled(" Open score  ", Style::default().fg(Color::DarkGray)),
            Span::styled("[q]", Style::default().fg(Color::Yellow)),
            Span::styled(" Quit", Style::default().fg(Color::DarkGray)),
        ])),
        area,
    );
}

/// Helper function to center a rectangle within another rectangle.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
