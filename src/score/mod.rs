//! MusicXML score handling.
//!
//! This module owns everything between raw MusicXML text and playback: the
//! note data model, the rendered-score handle with its cursor, and tempo
//! extraction.

mod model;
mod render;
mod tempo;

pub use model::{Pitch, ScoreNote, Step};
pub use render::{RenderedScore, ScoreError};
pub use tempo::{extract_tempo, DEFAULT_TEMPO};
