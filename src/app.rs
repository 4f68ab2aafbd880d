//! Application state and score lifecycle.
//!
//! Coordinates the loaded score handle, the playback controller, the audio
//! voice, and the file browser. The UI observes derived values only (tempo
//! label, playback state, cursor position); the engine handles themselves
//! never leak into the display layer.

use crate::audio::Voice;
use crate::playback::{Controller, PlaybackState};
use crate::score::{extract_tempo, RenderedScore, DEFAULT_TEMPO};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How long a transient status message stays visible.
const STATUS_EXPIRY_SECS: u64 = 3;

/// State for the score file browser dialog.
#[derive(Debug, Clone)]
pub struct FileBrowserState {
    /// Whether the browser is open.
    pub open: bool,
    /// Current directory path.
    pub current_dir: PathBuf,
    /// List of entries in current directory.
    pub entries: Vec<PathBuf>,
    /// Currently selected index.
    pub selected: usize,
    /// Scroll offset for long lists.
    pub scroll: usize,
}

impl Default for FileBrowserState {
    fn default() -> Self {
        Self {
            open: false,
            current_dir: std::env::current_dir().unwrap_or_default(),
            entries: Vec::new(),
            selected: 0,
            scroll: 0,
        }
    }
}

/// Extensions the file browser offers for loading.
fn is_score_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            ext == "xml" || ext == "musicxml"
        })
        .unwrap_or(false)
}

/// The application.
pub struct App {
    /// The loaded score, if any. Replaced wholesale on each load.
    score: Option<RenderedScore>,
    /// Tempo extracted from the loaded score. Absent until a load succeeds.
    tempo: Option<f64>,
    /// Playback state machine.
    controller: Controller,
    /// The audio voice; lives as long as the app, disposed once on drop.
    voice: Voice,
    /// Path of the loaded score, for the transport display.
    pub score_path: Option<PathBuf>,
    /// Score file browser dialog state.
    pub file_browser: FileBrowserState,
    /// Transient status message with its creation time.
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Creates the application.
    ///
    /// # Errors
    ///
    /// Returns error if the audio voice cannot be initialized.
    pub fn new() -> Result<Self> {
        Ok(Self {
            score: None,
            tempo: None,
            controller: Controller::new(),
            voice: Voice::new()?,
            score_path: None,
            file_browser: FileBrowserState::default(),
            status_message: None,
        })
    }

    /// The loaded score handle, if any.
    pub fn score(&self) -> Option<&RenderedScore> {
        self.score.as_ref()
    }

    /// The extracted tempo in BPM, once a score is loaded.
    pub fn tempo(&self) -> Option<f64> {
        self.tempo
    }

    /// The tempo readout, e.g. `"90 BPM"`. `None` until a score is loaded;
    /// a `.0` fraction is dropped for whole-number tempi.
    pub fn tempo_label(&self) -> Option<String> {
        let tempo = self.tempo?;
        if tempo.fract() == 0.0 {
            Some(format!("{} BPM", tempo as i64))
        } else {
            Some(format!("{} BPM", tempo))
        }
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.controller.state()
    }

    pub fn is_playing(&self) -> bool {
        self.controller.is_running()
    }

    /// Loads a score file, replacing any previous score.
    ///
    /// Any active playback session is cancelled first, so no tick can ever
    /// touch a replaced handle. The load is atomic: on failure the previous
    /// score, tempo, and path are left untouched.
    ///
    /// # Returns
    ///
    /// true if the score was loaded
    pub fn load_score(&mut self, path: PathBuf) -> bool {
        self.stop_playback();

        let xml = match std::fs::read_to_string(&path) {
            Ok(xml) => xml,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to read score file");
                self.set_status(format!("Read failed: {}", e));
                return false;
            }
        };

        match RenderedScore::load(&xml) {
            Ok(score) => {
                let tempo = extract_tempo(&xml);
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("score")
                    .to_string();
                tracing::info!(
                    path = %path.display(),
                    tempo,
                    notes = score.notes().len(),
                    "score loaded"
                );
                self.score = Some(score);
                self.tempo = Some(tempo);
                self.score_path = Some(path);
                self.set_status(format!("Loaded {}", name));
                true
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to render score");
                self.set_status(format!("Load failed: {}", e));
                false
            }
        }
    }

    /// Flips between Play and Stop, mirroring the single transport control.
    pub fn toggle_playback(&mut self) {
        if self.is_playing() {
            self.stop_playback();
        } else {
            self.play();
        }
    }

    /// Starts playback from the top of the score. No-op while already
    /// playing, and inert when no score is loaded.
    pub fn play(&mut self) {
        if self.is_playing() {
            return;
        }
        let tempo = self.tempo.unwrap_or(DEFAULT_TEMPO);
        let Some(score) = self.score.as_mut() else {
            return;
        };
        self.controller.play(score, tempo);
        self.set_status("Playing");
    }

    /// Stops playback. Safe to call when already stopped.
    pub fn stop_playback(&mut self) {
        if !self.is_playing() {
            return;
        }
        match self.score.as_mut() {
            Some(score) => self.controller.stop(score),
            None => self.controller.cancel(),
        }
        self.set_status("Stopped");
    }

    /// Fires any due playback ticks. Call once per event-loop iteration.
    pub fn update_playback(&mut self) {
        let Some(score) = self.score.as_mut() else {
            return;
        };
        let voice = &self.voice;
        self.controller
            .poll(score, Instant::now(), &mut |pitch, duration| {
                voice.trigger(pitch, duration)
            });
    }

    /// Sets a status message to display temporarily.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Clears expired status messages.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() > Duration::from_secs(STATUS_EXPIRY_SECS) {
                self.status_message = None;
            }
        }
    }

    // ========== FILE BROWSER METHODS ==========

    /// Opens the file browser for loading a score.
    pub fn open_file_browser(&mut self) {
        self.file_browser.open = true;
        self.file_browser.selected = 0;
        self.file_browser.scroll = 0;
        self.refresh_file_browser();
    }

    /// Refreshes the file browser entries.
    fn refresh_file_browser(&mut self) {
        self.file_browser.entries.clear();

        // Add parent directory entry if not at root
        if self.file_browser.current_dir.parent().is_some() {
            self.file_browser.entries.push(PathBuf::from(".."));
        }

        if let Ok(entries) = std::fs::read_dir(&self.file_browser.current_dir) {
            let mut dirs: Vec<PathBuf> = Vec::new();
            let mut files: Vec<PathBuf> = Vec::new();

            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    dirs.push(path);
                } else if is_score_file(&path) {
                    files.push(path);
                }
            }

            dirs.sort();
            files.sort();

            self.file_browser.entries.extend(dirs);
            self.file_browser.entries.extend(files);
        }

        if self.file_browser.selected >= self.file_browser.entries.len() {
            self.file_browser.selected = 0;
        }
    }

    /// Moves selection up in the file browser.
    pub fn file_browser_up(&mut self) {
        if self.file_browser.open && self.file_browser.selected > 0 {
            self.file_browser.selected -= 1;
            if self.file_browser.selected < self.file_browser.scroll {
                self.file_browser.scroll = self.file_browser.selected;
            }
        }
    }

    /// Moves selection down in the file browser.
    pub fn file_browser_down(&mut self) {
        if self.file_browser.open
            && self.file_browser.selected + 1 < self.file_browser.entries.len()
        {
            self.file_browser.selected += 1;
            // Scroll if needed (assuming ~10 visible entries)
            if self.file_browser.selected >= self.file_browser.scroll + 10 {
                self.file_browser.scroll = self.file_browser.selected.saturating_sub(9);
            }
        }
    }

    /// Selects the current entry: descends into directories, loads files.
    ///
    /// # Returns
    ///
    /// true if a score was loaded
    pub fn file_browser_select(&mut self) -> bool {
        if !self.file_browser.open || self.file_browser.entries.is_empty() {
            return false;
        }

        let selected_path = &self.file_browser.entries[self.file_browser.selected];

        if selected_path == &PathBuf::from("..") {
            if let Some(parent) = self.file_browser.current_dir.parent() {
                self.file_browser.current_dir = parent.to_path_buf();
                self.file_browser.selected = 0;
                self.file_browser.scroll = 0;
                self.refresh_file_browser();
            }
            false
        } else if selected_path.is_dir() {
            self.file_browser.current_dir = selected_path.clone();
            self.file_browser.selected = 0;
            self.file_browser.scroll = 0;
            self.refresh_file_browser();
            false
        } else {
            let path = selected_path.clone();
            self.file_browser.open = false;
            self.load_score(path)
        }
    }

    /// Cancels the file browser.
    pub fn file_browser_cancel(&mut self) {
        self.file_browser.open = false;
        self.set_status("Open cancelled");
    }
}
