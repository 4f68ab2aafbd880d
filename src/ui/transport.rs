//! Transport bar rendering.
//!
//! Displays the playback state, the tempo readout, the loaded file, and
//! transient status messages.

use crate::app::App;
use crate::playback::PlaybackState;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// Renders the transport bar at the top of the screen.
pub fn render_transport(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Transport ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(14), // Playback state
            Constraint::Length(14), // Tempo
            Constraint::Length(30), // Loaded file
            Constraint::Min(10),    // Status
        ])
        .split(inner);

    let play_status = match app.playback_state() {
        PlaybackState::Running => Span::styled(
            " [>] PLAYING ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        PlaybackState::Idle => Span::styled(
            " [.] STOPPED ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    };
    frame.render_widget(Paragraph::new(Line::from(play_status)), chunks[0]);

    // Tempo readout, hidden until a score is loaded.
    if let Some(label) = app.tempo_label() {
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Tempo: ", Style::default().fg(Color::DarkGray)),
                Span::styled(label, Style::default().fg(Color::White)),
            ])),
            chunks[1],
        );
    }

    let file_label = app
        .score_path
        .as_ref()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("no score loaded");
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("File: ", Style::default().fg(Color::DarkGray)),
            Span::styled(file_label, Style::default().fg(Color::Cyan)),
        ])),
        chunks[2],
    );

    if let Some((msg, _)) = &app.status_message {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                msg.as_str(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            ))),
            chunks[3],
        );
    }
}
