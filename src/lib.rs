//! scoretui - a terminal MusicXML score viewer and player.
//!
//! This library provides the core functionality for the score player app.

pub mod app;
pub mod audio;
pub mod playback;
pub mod score;
pub mod ui;

// Re-export commonly used types
pub use app::App;
pub use audio::{Voice, NOTE_DURATION};
pub use playback::{beat_interval, Controller, PlaybackState};
pub use score::{extract_tempo, Pitch, RenderedScore, ScoreError, ScoreNote, Step, DEFAULT_TEMPO};
