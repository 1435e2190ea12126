//! Chord transposition.
//!
//! Only the root (and slash bass) is rewritten; the quality suffix is carried
//! through untouched, so `"F#m7"` up two semitones becomes `"G#m7"`.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::EnhancedChordLine;

/// Root letter, optional accidental, then everything else.
#[allow(clippy::expect_used)]
static RE_ROOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-G])([#b]?)(.*)$").expect("valid regex: RE_ROOT")
});

/// "No chord" markers: `N.C.`, `NC`, `n.c`, ...
#[allow(clippy::expect_used)]
static RE_NO_CHORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^n\.?c\.?$").expect("valid regex: RE_NO_CHORD")
});

const SHARPS: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
const FLATS: [&str; 12] = ["C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"];

/// Transpose a chord symbol by `semitones`.
///
/// Flat spellings stay flat, everything else renders with sharps. Slash chords
/// transpose root and bass independently. Strings without a recognizable root
/// and "no chord" markers come back unchanged, as does any chord when
/// `semitones` is zero.
pub fn transpose_chord(chord: &str, semitones: i32) -> String {
    if semitones == 0 || RE_NO_CHORD.is_match(chord.trim()) {
        return chord.to_string();
    }

    match chord.split_once('/') {
        Some((main, bass)) => {
            let Some(main) = transpose_root(main, semitones) else {
                return chord.to_string();
            };
            let bass = transpose_root(bass, semitones).unwrap_or_else(|| bass.to_string());
            format!("{main}/{bass}")
        }
        None => transpose_root(chord, semitones).unwrap_or_else(|| chord.to_string()),
    }
}

/// Transpose every chord of every line.
pub fn transpose_line_chords(lines: &[EnhancedChordLine], semitones: i32) -> Vec<EnhancedChordLine> {
    lines
        .iter()
        .map(|line| {
            let mut line = line.clone();
            for c in &mut line.chords {
                c.chord = transpose_chord(&c.chord, semitones);
            }
            line
        })
        .collect()
}

fn transpose_root(symbol: &str, semitones: i32) -> Option<String> {
    let caps = RE_ROOT.captures(symbol)?;
    let letter = caps.get(1)?.as_str();
    let accidental = caps.get(2).map_or("", |m| m.as_str());
    let suffix = caps.get(3).map_or("", |m| m.as_str());

    let root = format!("{letter}{accidental}");
    let flat = accidental == "b";
    let table = if flat { &FLATS } else { &SHARPS };
    // E#, B#, Cb and Fb are absent from both tables
    let index = table.iter().position(|n| *n == root)?;

    let step = usize::try_from(semitones.rem_euclid(12)).ok()?;
    let shifted = (index + step) % 12;
    Some(format!("{}{suffix}", table[shifted]))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::types::LineChord;

    #[test]
    fn zero_is_identity() {
        for c in ["C", "F#m7", "Bbmaj7/D", "N.C.", "xyz", "", "H7"] {
            assert_eq!(transpose_chord(c, 0), c);
        }
    }

    #[test]
    fn basic_shifts() {
        assert_eq!(transpose_chord("C", 2), "D");
        assert_eq!(transpose_chord("C", 12), "C");
        assert_eq!(transpose_chord("B", 1), "C");
        assert_eq!(transpose_chord("C", -1), "B");
        assert_eq!(transpose_chord("F#m7", 2), "G#m7");
        assert_eq!(transpose_chord("Asus4", -14), "Gsus4");
    }

    #[test]
    fn flats_stay_flat() {
        assert_eq!(transpose_chord("Bb", 2), "C");
        assert_eq!(transpose_chord("Bb", 1), "B");
        assert_eq!(transpose_chord("Eb", 1), "E");
        assert_eq!(transpose_chord("Ab", 1), "A");
        assert_eq!(transpose_chord("Db", 1), "D");
        assert_eq!(transpose_chord("Eb", -1), "D");
        assert_eq!(transpose_chord("Gbm", 2), "Abm");
    }

    #[test]
    fn slash_chords() {
        assert_eq!(transpose_chord("G/B", 2), "A/C#");
        assert_eq!(transpose_chord("Bb/D", 1), "B/D#");
        // Unparseable bass is kept
        assert_eq!(transpose_chord("C/x", 2), "D/x");
    }

    #[test]
    fn unparseable_and_no_chord_pass_through() {
        assert_eq!(transpose_chord("N.C.", 5), "N.C.");
        assert_eq!(transpose_chord("nc", 5), "nc");
        assert_eq!(transpose_chord("H7", 3), "H7");
        assert_eq!(transpose_chord("Cb", 1), "Cb");
        assert_eq!(transpose_chord("", 4), "");
    }

    #[test]
    fn round_trip() {
        for c in ["C", "C#m", "D7", "F#", "G#dim", "A/C#", "Bmaj7"] {
            for n in -13..=13 {
                assert_eq!(transpose_chord(&transpose_chord(c, n), -n), c, "{c} by {n}");
            }
        }
    }

    #[test]
    fn flat_round_trip_respells_through_naturals() {
        assert_eq!(transpose_chord(&transpose_chord("Db", 1), -1), "C#");
        assert_eq!(transpose_chord(&transpose_chord("Bbm", 2), -2), "A#m");
        // Staying on a flat keeps the flat spelling
        assert_eq!(transpose_chord(&transpose_chord("Eb", 2), -2), "Eb");
        assert_eq!(transpose_chord(&transpose_chord("Ab7", 12), -12), "Ab7");
    }

    #[test]
    fn transposes_whole_lines() {
        let lines = vec![EnhancedChordLine {
            idx: 2,
            chords: vec![
                LineChord { start: 0, dur: Some(500), chord: "G".into(), word_idx: Some(0) },
                LineChord { start: 800, dur: None, chord: "Em".into(), word_idx: None },
            ],
        }];
        let up = transpose_line_chords(&lines, 3);
        assert_eq!(up[0].idx, 2);
        assert_eq!(up[0].chords[0].chord, "A#");
        assert_eq!(up[0].chords[0].dur, Some(500));
        assert_eq!(up[0].chords[1].chord, "G");
    }
}
