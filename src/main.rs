//! scoretui - a terminal MusicXML score viewer and player.
//!
//! Open a MusicXML file, see its note sequence and tempo, and play it back
//! with a moving cursor and a synthesized tone per note.
//!
//! # Usage
//!
//! ```bash
//! cargo run                    # browse for a score
//! cargo run -- song.musicxml   # open a score directly
//! ```

mod app;
mod audio;
mod playback;
mod score;
mod ui;

use app::App;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line options for the application.
struct CliOptions {
    /// Score to open at startup instead of browsing.
    score: Option<PathBuf>,
}

impl CliOptions {
    /// Parses command-line arguments.
    ///
    /// Supports:
    /// - a positional `.xml`/`.musicxml` path to open at startup
    /// - `--help` or `-h`: print help and exit
    fn parse() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let mut score: Option<PathBuf> = None;

        for arg in &args[1..] {
            match arg.as_str() {
                "--help" | "-h" => {
                    eprintln!("scoretui - terminal MusicXML score player");
                    eprintln!();
                    eprintln!(
                        "Usage: {} [SCORE]",
                        args.first().map(String::as_str).unwrap_or("scoretui")
                    );
                    eprintln!();
                    eprintln!("Arguments:");
                    eprintln!("  SCORE  A .xml or .musicxml file to open at startup");
                    eprintln!();
                    eprintln!("Options:");
                    eprintln!("  -h, --help  Print this help message");
                    eprintln!();
                    eprintln!("Without a score argument, a file browser opens on startup.");
                    std::process::exit(0);
                }
                other => {
                    let lower = other.to_lowercase();
                    if lower.ends_with(".xml") || lower.ends_with(".musicxml") {
                        score = Some(PathBuf::from(other));
                    } else {
                        eprintln!("Unknown option: {}", other);
                        eprintln!("Use --help for usage information");
                        std::process::exit(1);
                    }
                }
            }
        }

        Ok(Self { score })
    }
}

/// Main entry point.
fn main() -> Result<()> {
    // Parse CLI options first (before any terminal setup)
    let cli = CliOptions::parse()?;

    // Initialize logging (optional, for debugging)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut app = App::new().context("Failed to initialize application")?;

    match cli.score {
        Some(path) => {
            app.load_score(path);
        }
        None => app.open_file_browser(),
    }

    let mut terminal = setup_terminal().context("Failed to setup terminal")?;

    // Run main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    restore_terminal(&mut terminal).context("Failed to restore terminal")?;

    // Dropping `app` afterwards cancels any session and releases the voice.
    result
}

/// Sets up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Main application loop.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Fire any due playback ticks before drawing
        app.update_playback();
        app.clear_expired_status();

        // Draw UI
        terminal.draw(|frame| {
            ui::render(frame, app);

            // Draw file browser if open
            ui::render_file_browser(frame, app);
        })?;

        // Handle events with a short timeout to keep playback ticking
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // File browser input takes priority while open
                if app.file_browser.open {
                    match key.code {
                        KeyCode::Enter => {
                            app.file_browser_select();
                        }
                        KeyCode::Esc => {
                            app.file_browser_cancel();
                        }
                        KeyCode::Up | KeyCode::Char('k') => {
                            app.file_browser_up();
                        }
                        KeyCode::Down | KeyCode::Char('j') => {
                            app.file_browser_down();
                        }
                        _ => {}
                    }
                    continue;
                }

                match key.code {
                    // Quit
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(());
                    }
                    KeyCode::Char('q') => {
                        return Ok(());
                    }

                    // The single Play/Stop toggle
                    KeyCode::Char(' ') => {
                        app.toggle_playback();
                    }
                    KeyCode::Esc => {
                        app.stop_playback();
                    }

                    // Open a score
                    KeyCode::Char('o') => {
                        app.open_file_browser();
                    }

                    _ => {}
                }
            }
        }
    }
}
