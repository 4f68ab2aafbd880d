//! Playback control.
//!
//! The controller is a two-state machine, Idle and Running. A session
//! exists only while Running and holds nothing but the tick schedule; the
//! event loop polls the controller, which fires a tick each time one beat
//! interval has elapsed. Audio goes through a caller-supplied sink so the
//! stepping logic stays independent of the audio device.

use crate::audio::NOTE_DURATION;
use crate::score::{Pitch, RenderedScore};
use std::time::{Duration, Instant};

/// The controller's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No session; initial and terminal state.
    Idle,
    /// A session is active and ticks are being scheduled.
    Running,
}

/// Milliseconds per beat, expressed as a `Duration`: 60000 / tempo.
pub fn beat_interval(tempo: f64) -> Duration {
    Duration::from_secs_f64(60.0 / tempo)
}

/// An active playback session. Dropped on stop, on reaching the score end,
/// and at teardown.
#[derive(Debug)]
struct Session {
    interval: Duration,
    next_tick: Instant,
}

impl Session {
    fn new(tempo: f64, now: Instant) -> Self {
        let interval = beat_interval(tempo);
        Self {
            interval,
            next_tick: now + interval,
        }
    }

    /// True when a tick is due; advances the schedule by one interval so a
    /// slow frame catches up instead of dropping beats.
    fn poll_due(&mut self, now: Instant) -> bool {
        if now >= self.next_tick {
            self.next_tick += self.interval;
            true
        } else {
            false
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The cursor moved onto a note (audio fired unless it was invisible).
    Advanced,
    /// The score end was reached; the cursor was wrapped back to the start.
    Finished,
}

/// One timer tick.
///
/// The finished-check happens before any advance, and the advance happens
/// before the audio trigger for that note. Reaching the end wraps the
/// cursor to a consistent visual baseline and halts; playback never loops.
pub fn tick(score: &mut RenderedScore, trigger: &mut dyn FnMut(&Pitch, Duration)) -> TickOutcome {
    if !score.has_next() {
        score.reset_cursor();
        score.advance_cursor();
        return TickOutcome::Finished;
    }

    score.advance_cursor();
    if let Some(note) = score.current_note() {
        if !note.is_invisible() {
            if let Some(pitch) = note.pitch {
                trigger(&pitch, NOTE_DURATION);
            }
        }
    }
    TickOutcome::Advanced
}

/// Drives the cursor across a rendered score at a fixed beat interval.
#[derive(Debug, Default)]
pub struct Controller {
    session: Option<Session>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        if self.session.is_some() {
            PlaybackState::Running
        } else {
            PlaybackState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Starts a session: cursor back to the start and shown, first tick one
    /// beat interval from now. No-op while already Running.
    pub fn play(&mut self, score: &mut RenderedScore, tempo: f64) {
        if self.session.is_some() {
            return;
        }
        score.reset_cursor();
        score.show_cursor();
        self.session = Some(Session::new(tempo, Instant::now()));
        tracing::debug!(tempo, "playback started");
    }

    /// Cancels the session and hides the cursor. Safe to call from Idle.
    pub fn stop(&mut self, score: &mut RenderedScore) {
        if self.session.take().is_some() {
            score.hide_cursor();
            tracing::debug!("playback stopped");
        }
    }

    /// Drops the session without touching a score. Teardown path, and the
    /// guard used when the loaded score is being replaced.
    pub fn cancel(&mut self) {
        self.session = None;
    }

    /// Fires every tick due at `now`. Call once per event-loop iteration;
    /// reaching the score end stops the controller.
    pub fn poll(
        &mut self,
        score: &mut RenderedScore,
        now: Instant,
        trigger: &mut dyn FnMut(&Pitch, Duration),
    ) {
        let mut finished = false;
        if let Some(session) = self.session.as_mut() {
            while session.poll_due(now) {
                if tick(score, trigger) == TickOutcome::Finished {
                    finished = true;
                    break;
                }
            }
        }
        if finished {
            self.stop(score);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn three_note_score() -> RenderedScore {
        RenderedScore::load(
            r#"<score-partwise><part id="P1"><measure number="1">
                <note><pitch><step>C</step><octave>4</octave></pitch></note>
                <note><pitch><step>D</step><octave>4</octave></pitch></note>
                <note><pitch><step>E</step><octave>4</octave></pitch></note>
            </measure></part></score-partwise>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_beat_interval() {
        assert_eq!(beat_interval(60.0), Duration::from_millis(1000));
        assert_eq!(beat_interval(120.0), Duration::from_millis(500));
        // Non-terminating intervals round to whole nanoseconds.
        assert_eq!(beat_interval(90.0).as_nanos(), 666_666_667);
    }

    #[test]
    fn test_ticks_trigger_each_note_then_halt() {
        let mut score = three_note_score();
        score.reset_cursor();
        let mut played: Vec<String> = Vec::new();
        let mut sink = |pitch: &Pitch, _dur: Duration| played.push(pitch.to_string());

        let outcomes: Vec<TickOutcome> = (0..4).map(|_| tick(&mut score, &mut sink)).collect();

        // Three advances, then the fourth tick detects the end: wrap to
        // the first note, no audio, halt.
        assert_eq!(
            outcomes,
            vec![
                TickOutcome::Advanced,
                TickOutcome::Advanced,
                TickOutcome::Advanced,
                TickOutcome::Finished,
            ]
        );
        assert_eq!(played, vec!["C4", "D4", "E4"]);
        assert_eq!(score.cursor_position(), Some(0));
    }

    #[test]
    fn test_invisible_notes_trigger_no_audio() {
        let mut score = RenderedScore::load(
            r#"<score-partwise><part id="P1"><measure number="1">
                <note><pitch><step>C</step><octave>4</octave></pitch></note>
                <note><rest/></note>
                <note><pitch><step>G</step><octave>4</octave></pitch></note>
            </measure></part></score-partwise>"#,
        )
        .unwrap();
        let mut played: Vec<String> = Vec::new();
        let mut sink = |pitch: &Pitch, _dur: Duration| played.push(pitch.to_string());

        tick(&mut score, &mut sink);
        tick(&mut score, &mut sink); // the rest: cursor advances, no sound
        tick(&mut score, &mut sink);
        assert_eq!(played, vec!["C4", "G4"]);
        assert_eq!(score.cursor_position(), Some(2));
    }

    #[test]
    fn test_state_machine_transitions() {
        let mut score = three_note_score();
        let mut controller = Controller::new();
        assert_eq!(controller.state(), PlaybackState::Idle);

        controller.play(&mut score, 120.0);
        assert_eq!(controller.state(), PlaybackState::Running);
        assert_eq!(score.cursor_position(), None);
        assert!(score.cursor_visible());

        controller.stop(&mut score);
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(!score.cursor_visible());

        // stop() from Idle is a no-op, and must not hide a shown cursor.
        score.show_cursor();
        controller.stop(&mut score);
        assert!(score.cursor_visible());
    }

    #[test]
    fn test_play_while_running_is_a_noop() {
        let mut score = three_note_score();
        let mut controller = Controller::new();
        controller.play(&mut score, 120.0);
        score.advance_cursor();

        // A second play() must not reset the active session's cursor.
        controller.play(&mut score, 120.0);
        assert_eq!(score.cursor_position(), Some(0));
        assert_eq!(controller.state(), PlaybackState::Running);
    }

    #[test]
    fn test_poll_fires_due_ticks_and_auto_stops() {
        let mut score = three_note_score();
        let mut controller = Controller::new();
        let mut played: Vec<String> = Vec::new();

        controller.play(&mut score, 120.0); // 500ms interval
        let start = Instant::now();

        // Nothing due immediately after play().
        controller.poll(&mut score, start, &mut |p, _| played.push(p.to_string()));
        assert!(played.is_empty());
        assert_eq!(controller.state(), PlaybackState::Running);

        // Three intervals later all three notes have fired.
        controller.poll(&mut score, start + Duration::from_millis(1700), &mut |p, _| {
            played.push(p.to_string())
        });
        assert_eq!(played, vec!["C4", "D4", "E4"]);
        assert_eq!(controller.state(), PlaybackState::Running);

        // The next due tick hits the end: Running -> Idle automatically.
        controller.poll(&mut score, start + Duration::from_millis(2300), &mut |p, _| {
            played.push(p.to_string())
        });
        assert_eq!(played.len(), 3);
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(!score.cursor_visible());

        // Idle controller schedules nothing further.
        controller.poll(&mut score, start + Duration::from_millis(9000), &mut |p, _| {
            played.push(p.to_string())
        });
        assert_eq!(played.len(), 3);
    }

    #[test]
    fn test_cancel_is_unconditional() {
        let mut score = three_note_score();
        let mut controller = Controller::new();
        controller.play(&mut score, 90.0);
        controller.cancel();
        assert_eq!(controller.state(), PlaybackState::Idle);
        controller.cancel();
        assert_eq!(controller.state(), PlaybackState::Idle);
    }
}
