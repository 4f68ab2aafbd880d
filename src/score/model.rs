//! Score data model.
//!
//! Pitches and notes as extracted from MusicXML. A `ScoreNote` is one
//! cursor position in the rendered score; rests occupy positions but are
//! invisible to audio.

use std::fmt;

/// Diatonic step letter, as written in a MusicXML `<step>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    /// Semitone offset from C within one octave.
    pub fn semitone(self) -> i16 {
        match self {
            Step::C => 0,
            Step::D => 2,
            Step::E => 4,
            Step::F => 5,
            Step::G => 7,
            Step::A => 9,
            Step::B => 11,
        }
    }

    /// Parses a MusicXML step letter.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "C" => Some(Step::C),
            "D" => Some(Step::D),
            "E" => Some(Step::E),
            "F" => Some(Step::F),
            "G" => Some(Step::G),
            "A" => Some(Step::A),
            "B" => Some(Step::B),
            _ => None,
        }
    }

    /// The step letter as text.
    pub fn as_str(self) -> &'static str {
        match self {
            Step::C => "C",
            Step::D => "D",
            Step::E => "E",
            Step::F => "F",
            Step::G => "G",
            Step::A => "A",
            Step::B => "B",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A written pitch: step letter, chromatic alteration, and octave.
///
/// The `Display` form is the pitch token handed to the audio voice,
/// e.g. `"C4"`, `"F#4"`, or `"Bb3"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pitch {
    /// Step letter (C through B).
    pub step: Step,
    /// Chromatic alteration in semitones: 1 = sharp, -1 = flat.
    pub alter: i8,
    /// Scientific octave number. Octave 4 contains middle C.
    pub octave: i8,
}

impl Pitch {
    /// Creates an unaltered pitch.
    pub fn new(step: Step, octave: i8) -> Self {
        Self {
            step,
            alter: 0,
            octave,
        }
    }

    /// MIDI note number for this pitch. C4 = 60, A4 = 69.
    pub fn midi_number(&self) -> i16 {
        (self.octave as i16 + 1) * 12 + self.step.semitone() + self.alter as i16
    }

    /// Equal-tempered frequency in Hz, tuned to A4 = 440.
    pub fn frequency(&self) -> f64 {
        440.0 * 2f64.powf((self.midi_number() as f64 - 69.0) / 12.0)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.step.as_str())?;
        let accidental = if self.alter >= 0 { '#' } else { 'b' };
        for _ in 0..self.alter.unsigned_abs() {
            write!(f, "{}", accidental)?;
        }
        write!(f, "{}", self.octave)
    }
}

/// One position in the rendered score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreNote {
    /// The sounding pitch. Absent for rests and for notes whose pitch
    /// data could not be read.
    pub pitch: Option<Pitch>,
    /// Whether this position is a notated rest.
    pub rest: bool,
}

impl ScoreNote {
    /// A sounding note at the given pitch.
    pub fn pitched(pitch: Pitch) -> Self {
        Self {
            pitch: Some(pitch),
            rest: false,
        }
    }

    /// A notated rest.
    pub fn rest() -> Self {
        Self {
            pitch: None,
            rest: true,
        }
    }

    /// Invisible positions advance the cursor but trigger no audio.
    /// Rests are invisible, as are notes with unreadable pitch data.
    pub fn is_invisible(&self) -> bool {
        self.rest || self.pitch.is_none()
    }
}
