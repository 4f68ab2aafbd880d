//! The rendered-score handle.
//!
//! [`RenderedScore::load`] turns MusicXML text into an immutable sequence of
//! note positions plus a playback cursor. Loading is all-or-nothing: it
//! either produces a complete handle or an error, never a partial score.

use roxmltree::{Document, Node, ParsingOptions};
use thiserror::Error;

use super::model::{Pitch, ScoreNote, Step};

/// Errors raised while loading a score.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// The text is not well-formed XML.
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),
    /// The document is XML but not a partwise MusicXML score.
    #[error("unsupported root element '{0}': only score-partwise documents are supported")]
    UnsupportedRoot(String),
    /// The document parsed but holds nothing the cursor could visit.
    #[error("score contains no notes")]
    Empty,
}

/// A loaded score with its playback cursor.
///
/// The note sequence is immutable once loaded; the cursor is the only
/// mutable part. The cursor starts hidden-position (before the first note)
/// and visible.
#[derive(Debug, Clone)]
pub struct RenderedScore {
    title: Option<String>,
    notes: Vec<ScoreNote>,
    /// `None` means "before the first note" (the reset position).
    cursor: Option<usize>,
    cursor_visible: bool,
}

impl RenderedScore {
    /// Parses MusicXML text into a rendered score.
    ///
    /// Notes are collected in document order from the first part. A note
    /// marked `<chord/>` sounds together with its predecessor and collapses
    /// onto the same cursor position, so only the first note of a chord is
    /// kept. Rests become invisible positions.
    pub fn load(xml: &str) -> Result<Self, ScoreError> {
        // MusicXML files include a DOCTYPE declaration, so we must allow DTDs
        let options = ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };
        let doc = Document::parse_with_options(xml, options)?;
        let root = doc.root_element();

        if root.tag_name().name() != "score-partwise" {
            return Err(ScoreError::UnsupportedRoot(
                root.tag_name().name().to_string(),
            ));
        }

        let title = extract_title(&root);

        let mut notes = Vec::new();
        if let Some(part) = root.children().find(|n| n.has_tag_name("part")) {
            for measure in part.children().filter(|n| n.has_tag_name("measure")) {
                for node in measure.children().filter(|n| n.has_tag_name("note")) {
                    if let Some(note) = parse_note(&node) {
                        notes.push(note);
                    }
                }
            }
        }

        if notes.is_empty() {
            return Err(ScoreError::Empty);
        }

        Ok(Self {
            title,
            notes,
            cursor: None,
            cursor_visible: true,
        })
    }

    /// The work or movement title, when the document states one.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// All cursor positions in playback order.
    pub fn notes(&self) -> &[ScoreNote] {
        &self.notes
    }

    /// Moves the cursor back before the first note.
    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    /// Steps the cursor onto the next position, saturating at the last note.
    pub fn advance_cursor(&mut self) {
        self.cursor = Some(match self.cursor {
            None => 0,
            Some(i) => (i + 1).min(self.notes.len() - 1),
        });
    }

    /// Whether a position exists beyond the current one.
    pub fn has_next(&self) -> bool {
        match self.cursor {
            None => !self.notes.is_empty(),
            Some(i) => i + 1 < self.notes.len(),
        }
    }

    /// The note under the cursor, or `None` when reset.
    pub fn current_note(&self) -> Option<&ScoreNote> {
        self.cursor.and_then(|i| self.notes.get(i))
    }

    /// The cursor's index into [`Self::notes`], or `None` when reset.
    pub fn cursor_position(&self) -> Option<usize> {
        self.cursor
    }

    pub fn show_cursor(&mut self) {
        self.cursor_visible = true;
    }

    pub fn hide_cursor(&mut self) {
        self.cursor_visible = false;
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }
}

/// `<work><work-title>` is the usual home for a title; standalone movements
/// use `<movement-title>` instead.
fn extract_title(root: &Node) -> Option<String> {
    let work_title = root
        .children()
        .find(|n| n.has_tag_name("work"))
        .and_then(|work| {
            work.children()
                .find(|n| n.has_tag_name("work-title"))
                .and_then(|n| n.text())
        });
    let title = work_title.or_else(|| {
        root.children()
            .find(|n| n.has_tag_name("movement-title"))
            .and_then(|n| n.text())
    })?;
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Returns `None` for chord continuations, which share their predecessor's
/// cursor position.
fn parse_note(node: &Node) -> Option<ScoreNote> {
    if node.children().any(|n| n.has_tag_name("chord")) {
        return None;
    }
    if node.children().any(|n| n.has_tag_name("rest")) {
        return Some(ScoreNote::rest());
    }

    let pitch = node
        .children()
        .find(|n| n.has_tag_name("pitch"))
        .and_then(|p| parse_pitch(&p));
    // A note without readable pitch data still occupies a position; the
    // playback tick skips its audio trigger.
    Some(ScoreNote { pitch, rest: false })
}

fn parse_pitch(node: &Node) -> Option<Pitch> {
    let mut step = None;
    let mut alter = 0i8;
    let mut octave = None;

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "step" => step = child.text().and_then(Step::from_name),
            "alter" => {
                // MusicXML allows microtonal fractions; round to semitones.
                alter = child
                    .text()
                    .and_then(|t| t.trim().parse::<f64>().ok())
                    .map(|a| a.round() as i8)
                    .unwrap_or(0);
            }
            "octave" => octave = child.text().and_then(|t| t.trim().parse::<i8>().ok()),
            _ => {}
        }
    }

    Some(Pitch {
        step: step?,
        alter,
        octave: octave?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const THREE_NOTES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<score-partwise version="3.1">
  <work><work-title>Test Piece</work-title></work>
  <part-list><score-part id="P1"><part-name>Music</part-name></score-part></part-list>
  <part id="P1">
    <measure number="1">
      <direction><sound tempo="90"/></direction>
      <note><pitch><step>C</step><octave>4</octave></pitch><duration>1</duration></note>
      <note><pitch><step>D</step><octave>4</octave></pitch><duration>1</duration></note>
      <note><pitch><step>E</step><octave>4</octave></pitch><duration>1</duration></note>
    </measure>
  </part>
</score-partwise>"#;

    #[test]
    fn test_load_collects_notes_in_order() {
        let score = RenderedScore::load(THREE_NOTES).unwrap();
        let tokens: Vec<String> = score
            .notes()
            .iter()
            .map(|n| n.pitch.unwrap().to_string())
            .collect();
        assert_eq!(tokens, vec!["C4", "D4", "E4"]);
        assert_eq!(score.title(), Some("Test Piece"));
        assert!(score.cursor_visible());
        assert_eq!(score.cursor_position(), None);
    }

    #[test]
    fn test_cursor_walk() {
        let mut score = RenderedScore::load(THREE_NOTES).unwrap();

        // Reset position: before the first note, nothing current.
        assert!(score.has_next());
        assert!(score.current_note().is_none());

        score.advance_cursor();
        assert_eq!(score.current_note().unwrap().pitch.unwrap().to_string(), "C4");
        assert!(score.has_next());

        score.advance_cursor();
        score.advance_cursor();
        assert_eq!(score.current_note().unwrap().pitch.unwrap().to_string(), "E4");
        assert!(!score.has_next());

        // Advancing at the end saturates rather than running off the score.
        score.advance_cursor();
        assert_eq!(score.cursor_position(), Some(2));

        score.reset_cursor();
        assert_eq!(score.cursor_position(), None);
        assert!(score.has_next());
    }

    #[test]
    fn test_cursor_visibility_toggle() {
        let mut score = RenderedScore::load(THREE_NOTES).unwrap();
        score.hide_cursor();
        assert!(!score.cursor_visible());
        score.show_cursor();
        assert!(score.cursor_visible());
    }

    #[test]
    fn test_rests_are_invisible_positions() {
        let xml = r#"<score-partwise><part id="P1"><measure number="1">
            <note><pitch><step>C</step><octave>4</octave></pitch></note>
            <note><rest/><duration>1</duration></note>
            <note><pitch><step>G</step><octave>4</octave></pitch></note>
        </measure></part></score-partwise>"#;
        let score = RenderedScore::load(xml).unwrap();
        assert_eq!(score.notes().len(), 3);
        assert!(!score.notes()[0].is_invisible());
        assert!(score.notes()[1].is_invisible());
        assert!(!score.notes()[2].is_invisible());
    }

    #[test]
    fn test_chord_continuations_collapse() {
        let xml = r#"<score-partwise><part id="P1"><measure number="1">
            <note><pitch><step>C</step><octave>4</octave></pitch></note>
            <note><chord/><pitch><step>E</step><octave>4</octave></pitch></note>
            <note><chord/><pitch><step>G</step><octave>4</octave></pitch></note>
            <note><pitch><step>D</step><octave>4</octave></pitch></note>
        </measure></part></score-partwise>"#;
        let score = RenderedScore::load(xml).unwrap();
        let tokens: Vec<String> = score
            .notes()
            .iter()
            .map(|n| n.pitch.unwrap().to_string())
            .collect();
        assert_eq!(tokens, vec!["C4", "D4"]);
    }

    #[test]
    fn test_accidentals_survive() {
        let xml = r#"<score-partwise><part id="P1"><measure number="1">
            <note><pitch><step>F</step><alter>1</alter><octave>4</octave></pitch></note>
        </measure></part></score-partwise>"#;
        let score = RenderedScore::load(xml).unwrap();
        assert_eq!(score.notes()[0].pitch.unwrap().to_string(), "F#4");
    }

    #[test]
    fn test_unsupported_root_is_an_error() {
        let err = RenderedScore::load("<score-timewise/>").unwrap_err();
        assert!(matches!(err, ScoreError::UnsupportedRoot(name) if name == "score-timewise"));
    }

    #[test]
    fn test_empty_score_is_an_error() {
        let err = RenderedScore::load("<score-partwise><part id=\"P1\"/></score-partwise>")
            .unwrap_err();
        assert!(matches!(err, ScoreError::Empty));
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(matches!(
            RenderedScore::load("<score-partwise><unclosed"),
            Err(ScoreError::Xml(_))
        ));
    }
}
