//! Core data model shared by every stage of the engine.
//!
//! All times are milliseconds. Lyric-side times (`LyricLine`) use the LRC clock;
//! `WordTiming`, `WordPatch` and `ChordEvent` use the external source's clock
//! until a [`TimeTransform`] maps them across.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a parsed lyric line, used as a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineId(pub String);

impl LineId {
    /// Create a new `LineId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier assigned to the line at `index` in appearance order.
    pub fn for_index(index: usize) -> Self {
        Self(format!("line-{index}"))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for LineId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LineId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for LineId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One timestamped lyric line from the canonical lyrics source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricLine {
    /// Stable identifier.
    pub id: LineId,
    /// Display text with inline timing tags removed.
    pub text: String,
    /// Line start in the LRC clock.
    pub start_time_ms: i64,
    /// Line end in the LRC clock.
    pub end_time_ms: i64,
}

impl LyricLine {
    /// Create a line from its parts.
    pub fn new(id: impl Into<LineId>, text: impl Into<String>, start_time_ms: i64, end_time_ms: i64) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            start_time_ms,
            end_time_ms,
        }
    }

    /// Line duration, never negative.
    pub fn duration_ms(&self) -> i64 {
        (self.end_time_ms - self.start_time_ms).max(0)
    }
}

/// A lyric line split into display words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedLine {
    /// The source line.
    pub line: LyricLine,
    /// Whitespace-split words in original casing.
    pub words: Vec<String>,
}

impl TokenizedLine {
    /// Split a line's text on whitespace.
    pub fn from_line(line: &LyricLine) -> Self {
        Self {
            words: line.text.split_whitespace().map(String::from).collect(),
            line: line.clone(),
        }
    }

    /// Line start in the LRC clock.
    pub const fn start_time_ms(&self) -> i64 {
        self.line.start_time_ms
    }
}

/// One timestamped token from an external timing source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordTiming {
    /// Token start in the external clock.
    pub start_ms: i64,
    /// Token text as the source spelled it.
    pub text: String,
}

impl WordTiming {
    /// Create a word timing.
    pub fn new(start_ms: i64, text: impl Into<String>) -> Self {
        Self { start_ms, text: text.into() }
    }
}

/// Timing for one lyric word, produced by the word aligner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordPatch {
    /// Index of the lyric line.
    pub line_index: usize,
    /// Index of the word within the line.
    pub word_index: usize,
    /// Word start in the external clock.
    pub start_ms: i64,
    /// Word duration.
    pub duration_ms: i64,
}

/// A discrete chord change in the external clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordEvent {
    /// Chord start in the external clock.
    pub start_ms: i64,
    /// How long the chord sounds.
    pub duration_ms: i64,
    /// Chord symbol, e.g. `"F#m7"`.
    pub chord: String,
}

impl ChordEvent {
    /// Create a chord event.
    pub fn new(start_ms: i64, duration_ms: i64, chord: impl Into<String>) -> Self {
        Self {
            start_ms,
            duration_ms,
            chord: chord.into(),
        }
    }
}

/// A chord placed relative to the start of its lyric line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChord {
    /// Offset from the line start.
    pub start: u64,
    /// Duration in the LRC clock, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dur: Option<u64>,
    /// Chord symbol.
    pub chord: String,
    /// Word the chord sits over, when word-level attachment succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_idx: Option<usize>,
}

/// Chords for one lyric line. Lines without chords are omitted from payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancedChordLine {
    /// Index of the lyric line.
    pub idx: usize,
    /// Chords in time order.
    pub chords: Vec<LineChord>,
}

/// A known-good correspondence between the two clocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    /// Time in the external clock.
    pub gp_ms: f64,
    /// Matching time in the LRC clock.
    pub lrc_ms: f64,
}

impl Anchor {
    /// Create an anchor.
    pub const fn new(gp_ms: f64, lrc_ms: f64) -> Self {
        Self { gp_ms, lrc_ms }
    }

    /// Amount added to an external time to land in the LRC clock.
    pub fn shift(&self) -> f64 {
        self.lrc_ms - self.gp_ms
    }
}

/// Mapping from the external clock to the LRC clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TimeTransform {
    /// Constant shift.
    Offset {
        /// Milliseconds added to every external time.
        ms: f64,
    },
    /// Piecewise-linear shift between consecutive anchors.
    Anchored {
        /// Anchors ordered by external time.
        anchors: Vec<Anchor>,
    },
}

/// Which track of a multi-track tablature source supplied the timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Track index in the source document.
    pub index: usize,
    /// Track display name.
    pub name: String,
    /// Selection score that picked this track.
    pub score: f64,
}

/// The externally exchanged chord overlay artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordEnhancementPayload {
    /// Serialization layout revision.
    pub format_version: u32,
    /// Algorithm revision that produced the contents.
    pub algo_version: u32,
    /// Transform applied to external times, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_transform: Option<TimeTransform>,
    /// Source track, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<TrackInfo>,
    /// Sparse per-line chords, ordered by line index.
    pub lines: Vec<EnhancedChordLine>,
}

impl ChordEnhancementPayload {
    /// Create a payload stamped with the current format and algorithm versions.
    pub fn new(lines: Vec<EnhancedChordLine>) -> Self {
        Self {
            format_version: crate::constants::payload::FORMAT_VERSION,
            algo_version: crate::constants::payload::ALGO_VERSION,
            time_transform: None,
            track: None,
            lines,
        }
    }

    /// Chords recorded for a line, if the line has any.
    pub fn line(&self, idx: usize) -> Option<&EnhancedChordLine> {
        self.lines.iter().find(|l| l.idx == idx)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn line_id_for_index() {
        assert_eq!(LineId::for_index(3).as_str(), "line-3");
        assert_eq!(LineId::from("x").to_string(), "x");
    }

    #[test]
    fn tokenized_line_keeps_casing() {
        let line = LyricLine::new("line-0", "  Hello   World ", 1000, 2000);
        let tokenized = TokenizedLine::from_line(&line);
        assert_eq!(tokenized.words, vec!["Hello", "World"]);
        assert_eq!(tokenized.start_time_ms(), 1000);
    }

    #[test]
    fn line_chord_omits_absent_fields() {
        let chord = LineChord { start: 120, dur: None, chord: "G".into(), word_idx: None };
        let json = serde_json::to_string(&chord).unwrap();
        assert_eq!(json, r#"{"start":120,"chord":"G"}"#);
    }

    #[test]
    fn time_transform_is_tagged() {
        let json = serde_json::to_string(&TimeTransform::Offset { ms: -250.0 }).unwrap();
        assert_eq!(json, r#"{"kind":"offset","ms":-250.0}"#);

        let anchored = TimeTransform::Anchored { anchors: vec![Anchor::new(1000.0, 800.0)] };
        let json = serde_json::to_string(&anchored).unwrap();
        assert!(json.contains(r#""gpMs":1000.0"#));
        assert!(json.contains(r#""lrcMs":800.0"#));
    }

    #[test]
    fn negative_durations_clamp_to_zero() {
        let line = LyricLine::new("line-0", "x", 5000, 4000);
        assert_eq!(line.duration_ms(), 0);
    }
}
