//! Audio output.
//!
//! A single synthesized voice over rodio. Playback hands each note's pitch
//! token to the voice and moves on; nothing here blocks the UI loop.

mod voice;

pub use voice::{Voice, NOTE_DURATION, SAMPLE_RATE};
