//! Tempo extraction from MusicXML text.
//!
//! A score can state its tempo two ways: an explicit `tempo` attribute on a
//! `<sound>` element, or a metronome marking's `<per-minute>` element. The
//! first form wins when both are present.

use roxmltree::{Document, ParsingOptions};

/// Tempo used when the document states none.
pub const DEFAULT_TEMPO: f64 = 120.0;

/// Derives a beats-per-minute value from raw MusicXML text.
///
/// Fallback order, first match wins:
/// 1. the `tempo` attribute of the first `<sound>` element that carries one
/// 2. the text of the first `<per-minute>` element
/// 3. [`DEFAULT_TEMPO`]
///
/// A value that parses to zero, negative, or not-a-number counts as "not
/// found" and falls through to the next step. Malformed documents yield the
/// default; this function never fails.
pub fn extract_tempo(xml: &str) -> f64 {
    let options = ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = match Document::parse_with_options(xml, options) {
        Ok(doc) => doc,
        Err(_) => return DEFAULT_TEMPO,
    };

    let sound_tempo = doc
        .descendants()
        .find(|n| n.has_tag_name("sound") && n.has_attribute("tempo"))
        .and_then(|n| n.attribute("tempo"))
        .and_then(parse_bpm);
    if let Some(bpm) = sound_tempo {
        return bpm;
    }

    doc.descendants()
        .find(|n| n.has_tag_name("per-minute"))
        .and_then(|n| n.text())
        .and_then(parse_bpm)
        .unwrap_or(DEFAULT_TEMPO)
}

/// Accepts only finite, positive BPM values.
fn parse_bpm(raw: &str) -> Option<f64> {
    let bpm = raw.trim().parse::<f64>().ok()?;
    (bpm.is_finite() && bpm > 0.0).then_some(bpm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn score_with(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<score-partwise version="3.1">
  <part id="P1"><measure number="1">{}</measure></part>
</score-partwise>"#,
            body
        )
    }

    #[test]
    fn test_sound_tempo_wins() {
        let xml = score_with(
            r#"<direction><sound tempo="90"/></direction>
               <direction><direction-type><metronome><per-minute>72</per-minute></metronome></direction-type></direction>"#,
        );
        assert_eq!(extract_tempo(&xml), 90.0);
    }

    #[test]
    fn test_per_minute_fallback() {
        let xml = score_with(
            r#"<direction><direction-type><metronome><beat-unit>quarter</beat-unit><per-minute>72</per-minute></metronome></direction-type></direction>"#,
        );
        assert_eq!(extract_tempo(&xml), 72.0);
    }

    #[test]
    fn test_default_when_unstated() {
        let xml = score_with("<note><rest/></note>");
        assert_eq!(extract_tempo(&xml), DEFAULT_TEMPO);
    }

    #[test]
    fn test_zero_tempo_falls_through() {
        let xml = score_with(
            r#"<direction><sound tempo="0"/></direction>
               <direction><direction-type><metronome><per-minute>72</per-minute></metronome></direction-type></direction>"#,
        );
        assert_eq!(extract_tempo(&xml), 72.0);
    }

    #[test]
    fn test_unparseable_tempo_falls_through() {
        let xml = score_with(r#"<direction><sound tempo="abc"/></direction>"#);
        assert_eq!(extract_tempo(&xml), DEFAULT_TEMPO);
    }

    #[test]
    fn test_fractional_tempo() {
        let xml = score_with(r#"<direction><sound tempo="95.5"/></direction>"#);
        assert_eq!(extract_tempo(&xml), 95.5);
    }

    #[test]
    fn test_malformed_document_yields_default() {
        assert_eq!(extract_tempo("<score-partwise><unclosed"), DEFAULT_TEMPO);
        assert_eq!(extract_tempo(""), DEFAULT_TEMPO);
    }

    #[test]
    fn test_dtd_is_tolerated() {
        let xml = format!(
            "<?xml version=\"1.0\"?>\n<!DOCTYPE score-partwise PUBLIC \"-//Recordare//DTD MusicXML 3.1 Partwise//EN\" \"http://www.musicxml.org/dtds/partwise.dtd\">\n{}",
            score_with(r#"<direction><sound tempo="60"/></direction>"#)
                .lines()
                .skip(1)
                .collect::<Vec<_>>()
                .join("\n")
        );
        assert_eq!(extract_tempo(&xml), 60.0);
    }
}
