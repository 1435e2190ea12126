//! Combining a curated chord patch with a baseline chord sheet.
//!
//! The patch is authoritative: any lyric line it gives at least one chord is
//! taken from the patch alone. Remaining lines borrow chords from the
//! best-matching baseline line, if one scores above the configured threshold.

use serde::{Deserialize, Serialize};

use crate::align::chords::compact;
use crate::config::EngineConfig;
use crate::matching::CandidateIndex;
use crate::types::{ChordEnhancementPayload, LyricLine};

/// A chord positioned over a character of a baseline line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineChord {
    /// Chord symbol.
    pub chord: String,
    /// Character offset of the chord within the line text.
    pub char_index: usize,
    /// Explicit start in the sheet's own clock, when the sheet is timed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_ms: Option<i64>,
}

/// One line of a baseline chord sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineLine {
    /// Lyric text as printed on the sheet.
    pub text: String,
    /// Chords over this line, in reading order.
    pub chords: Vec<BaselineChord>,
}

/// A chord sheet from a secondary, lower-trust source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineChordSheet {
    /// Sheet lines in order.
    pub lines: Vec<BaselineLine>,
    /// Capo fret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capo: Option<u8>,
    /// Tuning description, e.g. `"Eb Ab Db Gb Bb Eb"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuning: Option<String>,
    /// Sheet clock minus LRC clock, applied to explicit chord times.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_ms: Option<f64>,
}

/// Where a merged line's chords came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChordSource {
    /// The curated override payload.
    Patch,
    /// The fuzzy-matched baseline sheet.
    Baseline,
    /// Neither source had chords for the line.
    None,
}

/// A chord at an absolute LRC time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedChord {
    /// Chord symbol.
    pub chord: String,
    /// Absolute time in the LRC clock.
    pub time_ms: i64,
    /// Word the chord sits over, carried from the patch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_idx: Option<usize>,
}

/// Chords for one lyric line after merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedLine {
    /// Index of the lyric line.
    pub idx: usize,
    /// Provenance of `chords`.
    pub source: ChordSource,
    /// Chords in time order.
    pub chords: Vec<MergedChord>,
}

/// Result of merging every lyric line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedResult {
    /// One entry per lyric line, in order.
    pub lines: Vec<MergedLine>,
    /// Capo from the baseline sheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capo: Option<u8>,
    /// Tuning from the baseline sheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuning: Option<String>,
    /// The patch's `formatVersion`, unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<u32>,
    /// The patch's `algoVersion`, unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algo_version: Option<u32>,
    /// Fraction of lyric lines that ended up with at least one chord.
    pub coverage: f64,
}

impl MergedResult {
    /// Count lines per source as `(patch, baseline, none)`.
    pub fn source_counts(&self) -> (usize, usize, usize) {
        self.lines.iter().fold((0, 0, 0), |(p, b, n), line| match line.source {
            ChordSource::Patch => (p + 1, b, n),
            ChordSource::Baseline => (p, b + 1, n),
            ChordSource::None => (p, b, n + 1),
        })
    }
}

/// Merge patch and baseline chords onto the lyric lines.
pub fn merge_chord_sources(
    lines: &[LyricLine],
    baseline: Option<&BaselineChordSheet>,
    patch: Option<&ChordEnhancementPayload>,
    config: &EngineConfig,
) -> MergedResult {
    let index = baseline.map(|sheet| {
        let texts: Vec<&str> = sheet.lines.iter().map(|l| l.text.as_str()).collect();
        CandidateIndex::new(&texts)
    });

    let merged: Vec<MergedLine> = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            if let Some(chords) = patch.and_then(|p| patch_chords(p, idx, line)) {
                return MergedLine { idx, source: ChordSource::Patch, chords };
            }

            let from_baseline = baseline.zip(index.as_ref()).and_then(|(sheet, index)| {
                let (best, _) = index.best(&line.text, config.line_match_threshold)?;
                baseline_chords(sheet, &sheet.lines[best], line)
            });
            match from_baseline {
                Some(chords) => MergedLine { idx, source: ChordSource::Baseline, chords },
                None => MergedLine { idx, source: ChordSource::None, chords: Vec::new() },
            }
        })
        .collect();

    let with_chords = merged.iter().filter(|l| !l.chords.is_empty()).count();
    #[allow(clippy::cast_precision_loss)]
    let coverage = if merged.is_empty() { 0.0 } else { with_chords as f64 / merged.len() as f64 };

    let result = MergedResult {
        lines: merged,
        capo: baseline.and_then(|b| b.capo),
        tuning: baseline.and_then(|b| b.tuning.clone()),
        format_version: patch.map(|p| p.format_version),
        algo_version: patch.map(|p| p.algo_version),
        coverage,
    };

    let (from_patch, from_baseline, empty) = result.source_counts();
    tracing::debug!("Merged chords: {from_patch} patch, {from_baseline} baseline, {empty} empty lines");
    result
}

#[allow(clippy::cast_possible_wrap)]
fn patch_chords(patch: &ChordEnhancementPayload, idx: usize, line: &LyricLine) -> Option<Vec<MergedChord>> {
    let entry = patch.line(idx).filter(|l| !l.chords.is_empty())?;
    let chords = entry
        .chords
        .iter()
        .map(|c| MergedChord {
            chord: c.chord.clone(),
            time_ms: line.start_time_ms + c.start as i64,
            word_idx: c.word_idx,
        })
        .collect();
    Some(compact(chords, |c| c.chord.as_str()))
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn baseline_chords(sheet: &BaselineChordSheet, source: &BaselineLine, line: &LyricLine) -> Option<Vec<MergedChord>> {
    let text_len = source.text.chars().count().max(1) as f64;
    let offset = sheet.offset_ms.unwrap_or(0.0);

    let mut chords: Vec<MergedChord> = source
        .chords
        .iter()
        .filter(|c| !c.chord.trim().is_empty())
        .map(|c| {
            let time_ms = c.start_ms.map_or_else(
                || {
                    let fraction = (c.char_index as f64 / text_len).clamp(0.0, 1.0);
                    line.start_time_ms + (fraction * line.duration_ms() as f64).round() as i64
                },
                |start| (start as f64 - offset).round() as i64,
            );
            MergedChord { chord: c.chord.trim().to_string(), time_ms, word_idx: None }
        })
        .collect();
    chords.sort_by_key(|c| c.time_ms);

    let chords = compact(chords, |c| c.chord.as_str());
    (!chords.is_empty()).then_some(chords)
}
