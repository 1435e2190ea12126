//! Chord-to-line and chord-to-word assignment.
//!
//! Every lyric line owns a window from 300 ms before its start up to 300 ms
//! past the next line's start. Chords whose mapped time falls inside a window
//! are placed on that line relative to its start; because neighbouring
//! windows overlap by the tolerance, a chord near a boundary may land on both
//! lines. Each line's list is then de-duplicated and capped.

use std::collections::HashMap;

use crate::align::transform::map_time;
use crate::constants::chords::{DEFAULT_LINE_DURATION_MS, LINE_TOLERANCE_MS, MAX_CHORDS_PER_LINE};
use crate::types::{ChordEvent, EnhancedChordLine, LineChord, LyricLine, TimeTransform, WordPatch};

/// A chord event mapped into the LRC clock.
#[derive(Debug, Clone)]
struct MappedChord<'a> {
    time: f64,
    dur: Option<u64>,
    chord: &'a str,
}

/// Assign chords to lyric lines.
pub fn align_chords_to_lrc(
    chords: &[ChordEvent],
    lines: &[LyricLine],
    transform: Option<&TimeTransform>,
) -> Vec<EnhancedChordLine> {
    assign(chords, lines, transform, |_, _| None)
}

/// Assign chords to lyric lines and annotate each with the word it falls on.
///
/// The chosen word is the latest one whose known start is at or before the
/// chord; when the chord precedes every timed word, the earliest timed word
/// is used. Lines without any timed word leave `word_idx` unset.
#[allow(clippy::cast_precision_loss)]
pub fn align_chords_to_words(
    chords: &[ChordEvent],
    lines: &[LyricLine],
    word_patches: &[WordPatch],
    transform: Option<&TimeTransform>,
) -> Vec<EnhancedChordLine> {
    let mut word_times: HashMap<usize, Vec<(usize, f64)>> = HashMap::new();
    for p in word_patches {
        word_times
            .entry(p.line_index)
            .or_default()
            .push((p.word_index, map_time(p.start_ms as f64, transform)));
    }

    assign(chords, lines, transform, |line_index, time| {
        word_times.get(&line_index).and_then(|words| word_at(words, time))
    })
}

/// Word index for a chord at `time` among `(word_index, start)` pairs.
fn word_at(words: &[(usize, f64)], time: f64) -> Option<usize> {
    let latest_before = words
        .iter()
        .filter(|(_, start)| *start <= time)
        .max_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    if let Some((idx, _)) = latest_before {
        return Some(*idx);
    }

    words
        .iter()
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|(idx, _)| *idx)
}

/// Inclusion window `[lo, hi)` of line `i` in the LRC clock.
#[allow(clippy::cast_precision_loss)]
fn line_window(lines: &[LyricLine], i: usize) -> (f64, f64) {
    let start = lines[i].start_time_ms;
    let next = lines
        .get(i + 1)
        .map(|l| l.start_time_ms)
        .filter(|next| *next > start)
        .unwrap_or(start + DEFAULT_LINE_DURATION_MS);
    (start as f64 - LINE_TOLERANCE_MS, next as f64 + LINE_TOLERANCE_MS)
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn map_chords<'a>(chords: &'a [ChordEvent], transform: Option<&TimeTransform>) -> Vec<MappedChord<'a>> {
    let mut mapped: Vec<MappedChord<'a>> = chords
        .iter()
        .filter(|c| !c.chord.trim().is_empty())
        .map(|c| {
            let time = map_time(c.start_ms as f64, transform);
            let dur = (c.duration_ms > 0).then(|| {
                let end = map_time((c.start_ms + c.duration_ms) as f64, transform);
                (end - time).max(0.0).round() as u64
            });
            MappedChord { time, dur, chord: c.chord.trim() }
        })
        .collect();
    mapped.sort_by(|a, b| a.time.total_cmp(&b.time));
    mapped
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn assign<F>(
    chords: &[ChordEvent],
    lines: &[LyricLine],
    transform: Option<&TimeTransform>,
    word_for: F,
) -> Vec<EnhancedChordLine>
where
    F: Fn(usize, f64) -> Option<usize>,
{
    let mapped = map_chords(chords, transform);
    let mut out = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let (lo, hi) = line_window(lines, idx);
        let line_start = line.start_time_ms as f64;

        let placed: Vec<LineChord> = mapped
            .iter()
            .filter(|c| c.time >= lo && c.time < hi)
            .map(|c| LineChord {
                start: (c.time - line_start).max(0.0).round() as u64,
                dur: c.dur,
                chord: c.chord.to_string(),
                word_idx: word_for(idx, c.time),
            })
            .collect();

        let chords = compact(placed, |c| c.chord.as_str());
        if !chords.is_empty() {
            out.push(EnhancedChordLine { idx, chords });
        }
    }

    tracing::debug!("Placed chords on {} of {} lines", out.len(), lines.len());
    out
}

/// Drop entries repeating their predecessor's chord, then keep the earliest four.
pub(crate) fn compact<T>(items: Vec<T>, chord_of: impl Fn(&T) -> &str) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len().min(MAX_CHORDS_PER_LINE));
    for item in items {
        if out.last().is_some_and(|prev| chord_of(prev) == chord_of(&item)) {
            continue;
        }
        out.push(item);
        if out.len() == MAX_CHORDS_PER_LINE {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn lines(starts: &[i64]) -> Vec<LyricLine> {
        starts
            .iter()
            .enumerate()
            .map(|(i, s)| LyricLine::new(format!("line-{i}"), "some words here", *s, *s + 4000))
            .collect()
    }

    fn chord(start_ms: i64, name: &str) -> ChordEvent {
        ChordEvent::new(start_ms, 0, name)
    }

    fn names(line: &EnhancedChordLine) -> Vec<&str> {
        line.chords.iter().map(|c| c.chord.as_str()).collect()
    }

    #[test]
    fn chords_land_on_their_line() {
        let lyric = lines(&[0, 5_000, 10_000]);
        let events = vec![chord(1_000, "C"), chord(6_000, "G"), chord(12_000, "Am")];
        let result = align_chords_to_lrc(&events, &lyric, None);

        assert_eq!(result.len(), 3);
        assert_eq!(names(&result[0]), vec!["C"]);
        assert_eq!(result[0].chords[0].start, 1_000);
        assert_eq!(names(&result[1]), vec!["G"]);
        assert_eq!(result[1].chords[0].start, 1_000);
        assert_eq!(result[2].chords[0].start, 2_000);
    }

    #[test]
    fn tolerance_edges() {
        let lyric = lines(&[10_000, 20_000]);

        // Exactly at start - tolerance is included; start is clamped to 0
        let at_edge = align_chords_to_lrc(&[chord(9_700, "D")], &lyric, None);
        assert_eq!(at_edge.len(), 1);
        assert_eq!(at_edge[0].idx, 0);
        assert_eq!(at_edge[0].chords[0].start, 0);

        // One millisecond further out is excluded
        let outside = align_chords_to_lrc(&[chord(9_699, "D")], &lyric, None);
        assert!(outside.is_empty());

        // Line 0 reaches up to next start + tolerance, exclusive
        let late = align_chords_to_lrc(&[chord(20_299, "E")], &lyric, None);
        assert_eq!(late.iter().map(|l| l.idx).collect::<Vec<_>>(), vec![0, 1]);
        let past = align_chords_to_lrc(&[chord(20_300, "E")], &lyric, None);
        assert_eq!(past.iter().map(|l| l.idx).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn next_line_downbeat_never_displaces_own_chords() {
        let lyric = lines(&[0, 5_000]);
        let events = vec![
            chord(500, "C"),
            chord(1_500, "G"),
            chord(2_500, "Am"),
            chord(3_500, "F"),
            chord(5_000, "D"),
        ];
        let result = align_chords_to_lrc(&events, &lyric, None);

        assert_eq!(names(&result[0]), vec!["C", "G", "Am", "F"]);
        assert_eq!(names(&result[1]), vec!["D"]);
        assert_eq!(result[1].chords[0].start, 0);
    }

    #[test]
    fn last_line_uses_default_duration() {
        let lyric = lines(&[0]);
        let inside = align_chords_to_lrc(&[chord(10_299, "F")], &lyric, None);
        assert_eq!(inside.len(), 1);
        let outside = align_chords_to_lrc(&[chord(10_300, "F")], &lyric, None);
        assert!(outside.is_empty());
    }

    #[test]
    fn repeated_chords_collapse_and_cap_at_four() {
        let lyric = lines(&[0]);
        let events = vec![
            chord(100, "C"),
            chord(200, "C"),
            chord(300, "G"),
            chord(400, "Am"),
            chord(500, "Am"),
            chord(600, "F"),
            chord(700, "C"),
            chord(800, "G"),
        ];
        let result = align_chords_to_lrc(&events, &lyric, None);
        assert_eq!(names(&result[0]), vec!["C", "G", "Am", "F"]);
        assert_eq!(result[0].chords[1].start, 300);
    }

    #[test]
    fn transform_shifts_chords() {
        let lyric = lines(&[0, 5_000]);
        let transform = TimeTransform::Offset { ms: -2_000.0 };
        let result = align_chords_to_lrc(&[ChordEvent::new(8_000, 1_000, "Bb")], &lyric, Some(&transform));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].idx, 1);
        assert_eq!(result[0].chords[0].start, 1_000);
        assert_eq!(result[0].chords[0].dur, Some(1_000));
    }

    #[test]
    fn chord_without_duration_has_no_dur() {
        let lyric = lines(&[0]);
        let result = align_chords_to_lrc(&[chord(100, "C")], &lyric, None);
        assert_eq!(result[0].chords[0].dur, None);
        assert_eq!(result[0].chords[0].word_idx, None);
    }

    #[test]
    fn chords_attach_to_words() {
        let lyric = lines(&[0, 10_000]);
        let patches = vec![
            WordPatch { line_index: 0, word_index: 0, start_ms: 500, duration_ms: 300 },
            WordPatch { line_index: 0, word_index: 1, start_ms: 1_500, duration_ms: 300 },
            WordPatch { line_index: 0, word_index: 2, start_ms: 2_500, duration_ms: 300 },
        ];
        let events = vec![chord(200, "C"), chord(1_600, "G"), chord(2_500, "D"), chord(11_000, "Em")];
        let result = align_chords_to_words(&events, &lyric, &patches, None);

        let words: Vec<_> = result[0].chords.iter().map(|c| c.word_idx).collect();
        // 200ms precedes every timed word, so the earliest one is used
        assert_eq!(words, vec![Some(0), Some(1), Some(2)]);
        // Line 1 has no timed words
        assert_eq!(result[1].chords[0].word_idx, None);
    }

    #[test]
    fn word_times_go_through_the_transform() {
        let lyric = lines(&[0]);
        let patches = vec![
            WordPatch { line_index: 0, word_index: 0, start_ms: 3_000, duration_ms: 300 },
            WordPatch { line_index: 0, word_index: 1, start_ms: 4_000, duration_ms: 300 },
        ];
        let transform = TimeTransform::Offset { ms: -3_000.0 };
        let result = align_chords_to_words(&[chord(4_100, "A")], &lyric, &patches, Some(&transform));
        assert_eq!(result[0].chords[0].start, 1_100);
        assert_eq!(result[0].chords[0].word_idx, Some(1));
    }

    #[test]
    fn empty_chord_names_are_ignored() {
        let lyric = lines(&[0]);
        let result = align_chords_to_lrc(&[chord(100, "  ")], &lyric, None);
        assert!(result.is_empty());
    }

    #[test]
    fn compact_dedups_before_capping() {
        let items = vec!["A", "A", "B", "B", "C", "D", "E"];
        assert_eq!(compact(items, |s| s), vec!["A", "B", "C", "D"]);
    }
}
