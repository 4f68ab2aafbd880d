//! Score panel rendering.
//!
//! Lays the loaded score's note positions out left to right, wrapping into
//! rows, and highlights the playback cursor when it is visible. Rests are
//! drawn dimmed. This is a positional view of the rendered-score handle,
//! not engraved notation.

use crate::app::App;
use crate::score::{RenderedScore, ScoreNote};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// Display width of one note cell, including its trailing gap.
const CELL_WIDTH: usize = 5;

/// Renders the score panel.
pub fn render_score(frame: &mut Frame, area: Rect, app: &App) {
    let title = match app.score().and_then(RenderedScore::title) {
        Some(name) => format!(" Score: {} ", name),
        None => " Score ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(score) = app.score() else {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "No score loaded. Press 'o' to open a MusicXML file.",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ))),
            inner,
        );
        return;
    };

    let cols = (inner.width as usize / CELL_WIDTH).max(1);
    let cursor = score
        .cursor_position()
        .filter(|_| score.cursor_visible());

    let mut lines: Vec<Line> = Vec::new();
    for (row_index, row) in score.notes().chunks(cols).enumerate() {
        let mut spans: Vec<Span> = Vec::with_capacity(row.len());
        for (col_index, note) in row.iter().enumerate() {
            let index = row_index * cols + col_index;
            spans.push(note_cell(note, cursor == Some(index)));
        }
        lines.push(Line::from(spans));
    }

    // Keep the cursor's row in view for scores longer than the panel.
    let visible_rows = inner.height as usize;
    let offset = match cursor {
        Some(index) if visible_rows > 0 => {
            let cursor_row = index / cols;
            cursor_row.saturating_sub(visible_rows.saturating_sub(1))
        }
        _ => 0,
    };
    let end = (offset + visible_rows).min(lines.len());
    let visible: Vec<Line> = lines[offset.min(lines.len())..end].to_vec();

    frame.render_widget(Paragraph::new(visible), inner);
}

/// One fixed-width note cell, highlighted when the cursor is on it.
fn note_cell(note: &ScoreNote, under_cursor: bool) -> Span<'static> {
    let (token, style) = match note.pitch {
        Some(pitch) => (pitch.to_string(), Style::default().fg(Color::White)),
        None if note.rest => ("--".to_string(), Style::default().fg(Color::DarkGray)),
        None => ("??".to_string(), Style::default().fg(Color::DarkGray)),
    };

    let style = if under_cursor {
        style
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        style
    };

    Span::styled(format!("{:<width$}", token, width = CELL_WIDTH), style)
}
