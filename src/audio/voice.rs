//! Monophonic tone synthesis for playback.
//!
//! Provides a single voice over a rodio output stream. Each trigger
//! synthesizes a short enveloped sine tone and hands it to the audio
//! thread; the caller never waits on it.

use crate::score::Pitch;
use anyhow::{Context, Result};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle};
use std::f64::consts::TAU;
use std::time::Duration;

/// Sample rate for tone synthesis (44.1 kHz standard).
pub const SAMPLE_RATE: u32 = 44_100;

/// Trigger length for one note: a sixteenth at the 120 BPM reference.
/// The score player uses this fixed unit regardless of score tempo.
pub const NOTE_DURATION: Duration = Duration::from_millis(125);

/// Peak amplitude of the synthesized tone.
const AMPLITUDE: f32 = 0.3;

/// Linear attack ramp, in samples.
const ATTACK_SAMPLES: usize = (SAMPLE_RATE / 100) as usize;

/// Linear release ramp, in samples.
const RELEASE_SAMPLES: usize = (SAMPLE_RATE / 20) as usize;

/// The playback voice.
///
/// Owns the audio output stream for the lifetime of the application.
/// Dropping the voice stops all pending sound and releases the output
/// device; that happens exactly once, at teardown.
pub struct Voice {
    /// Audio output stream (must be kept alive).
    _stream: OutputStream,
    /// Audio output handle for submitting tones.
    handle: OutputStreamHandle,
}

impl Voice {
    /// Opens the default audio output.
    ///
    /// # Errors
    ///
    /// Returns error if no audio output device is available.
    pub fn new() -> Result<Self> {
        let (stream, handle) =
            OutputStream::try_default().context("Failed to open audio output")?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    /// Plays a tone at the given pitch for the given duration.
    ///
    /// Fire-and-forget: the tone is synthesized up front and submitted to
    /// the audio thread, so this returns without blocking the playback
    /// tick. Engine errors are logged and absorbed.
    pub fn trigger(&self, pitch: &Pitch, duration: Duration) {
        let samples = render_tone(pitch.frequency(), duration);
        let source = SamplesBuffer::new(1, SAMPLE_RATE, samples);
        if let Err(e) = self.handle.play_raw(source) {
            tracing::warn!(pitch = %pitch, error = %e, "audio trigger failed");
        }
    }
}

impl Drop for Voice {
    fn drop(&mut self) {
        // The stream drops with us, which silences anything still sounding.
        tracing::debug!("audio voice released");
    }
}

/// Synthesizes a sine tone with a linear attack/release envelope.
fn render_tone(frequency: f64, duration: Duration) -> Vec<f32> {
    let total = (duration.as_secs_f64() * SAMPLE_RATE as f64) as usize;
    let attack = ATTACK_SAMPLES.min(total / 2).max(1);
    let release = RELEASE_SAMPLES.min(total / 2).max(1);

    (0..total)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE as f64;
            let envelope = if i < attack {
                i as f32 / attack as f32
            } else if total - i <= release {
                (total - i) as f32 / release as f32
            } else {
                1.0
            };
            (t * frequency * TAU).sin() as f32 * AMPLITUDE * envelope
        })
        .collect()
}
