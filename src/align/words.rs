//! Word-level alignment of an external timing source onto lyric lines.
//!
//! The external source tokenizes independently of the lyrics, so one lyric
//! word may correspond to one external token, to several (a hyphenated word
//! sung as syllables), or to part of one (two lyric words run together). The
//! primary pass walks both sequences forward with a bounded lookahead over
//! the external tokens. A recovery pass then revisits lines that got nothing,
//! searching the gap between their matched neighbours.

use std::ops::Range;

use crate::config::EngineConfig;
use crate::constants::words::{DEFAULT_WORD_DURATION_MS, MAX_JOIN_TOKENS, MAX_SPLIT_WORDS};
use crate::lyrics::normalize::normalize_word;
use crate::types::{TokenizedLine, WordPatch, WordTiming};

/// Result of aligning external word timings onto lyric lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordAlignment {
    /// Word timings, ordered by line then word.
    pub patches: Vec<WordPatch>,
    /// Lyric words that received a patch.
    pub matched_words: usize,
    /// Lyric words that could have been matched (non-empty after normalization).
    pub total_words: usize,
    /// Per line, the first and last external token consumed.
    line_spans: Vec<Option<(usize, usize)>>,
}

impl WordAlignment {
    /// Fraction of lyric words that were matched, in `[0, 1]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn coverage(&self) -> f64 {
        if self.total_words == 0 {
            return 0.0;
        }
        (self.matched_words as f64 / self.total_words as f64).clamp(0.0, 1.0)
    }

    /// Patches belonging to one line.
    pub fn patches_for_line(&self, line_index: usize) -> impl Iterator<Item = &WordPatch> {
        self.patches.iter().filter(move |p| p.line_index == line_index)
    }

    /// Number of lines with at least one patch.
    pub fn matched_line_count(&self) -> usize {
        self.line_spans.iter().filter(|s| s.is_some()).count()
    }
}

/// Patches produced for one line by a single matching attempt.
#[derive(Debug, Default)]
struct LineMatch {
    patches: Vec<WordPatch>,
    span: Option<(usize, usize)>,
}

/// A successful match starting at one lyric word.
struct Step {
    patches: Vec<WordPatch>,
    lyric_words: usize,
    ext_end: usize,
}

/// Normalized view of both sequences.
struct Aligner<'a> {
    lyric: Vec<Vec<String>>,
    ext: Vec<String>,
    timings: &'a [WordTiming],
    durations: Vec<i64>,
}

impl<'a> Aligner<'a> {
    fn new(lines: &[TokenizedLine], timings: &'a [WordTiming], config: &EngineConfig) -> Self {
        let lyric = lines
            .iter()
            .map(|l| l.words.iter().map(|w| normalize_word(w)).collect())
            .collect();
        let ext = timings.iter().map(|w| normalize_word(&w.text)).collect();
        let durations = infer_durations(timings, config.max_word_duration_ms);
        Self { lyric, ext, timings, durations }
    }

    fn countable(&self, line_index: usize) -> usize {
        self.lyric[line_index].iter().filter(|w| !w.is_empty()).count()
    }

    fn total_countable(&self) -> usize {
        (0..self.lyric.len()).map(|li| self.countable(li)).sum()
    }

    /// Align one line against `range` of the external tokens.
    fn match_line(&self, line_index: usize, range: Range<usize>, lookahead: usize) -> LineMatch {
        let words = &self.lyric[line_index];
        let mut result = LineMatch::default();
        let mut cursor = range.start;
        let mut wi = 0;

        while wi < words.len() {
            if words[wi].is_empty() {
                wi += 1;
                continue;
            }

            let window_end = range.end.min(cursor.saturating_add(lookahead));
            let step = (cursor..window_end)
                .find_map(|k| self.try_match_at(line_index, wi, k, range.end).map(|s| (k, s)));

            match step {
                Some((k, step)) => {
                    let last = step.ext_end - 1;
                    result.span = Some(result.span.map_or((k, last), |(first, _)| (first, last)));
                    result.patches.extend(step.patches);
                    cursor = step.ext_end;
                    wi += step.lyric_words;
                }
                None => wi += 1,
            }
        }

        result
    }

    /// Try exact, joined and split correspondences at external position `k`.
    fn try_match_at(&self, li: usize, wi: usize, k: usize, end: usize) -> Option<Step> {
        let target = &self.lyric[li][wi];
        let token = &self.ext[k];
        if token.is_empty() {
            return None;
        }

        if token == target {
            return Some(Step {
                patches: vec![self.patch(li, wi, k, k)],
                lyric_words: 1,
                ext_end: k + 1,
            });
        }

        if let Some(last) = self.join_at(target, k, end) {
            return Some(Step {
                patches: vec![self.patch(li, wi, k, last)],
                lyric_words: 1,
                ext_end: last + 1,
            });
        }

        self.split_at(li, wi, k).map(|patches| Step {
            lyric_words: patches.len(),
            patches,
            ext_end: k + 1,
        })
    }

    /// Index of the last external token when `k..=last` concatenates to `target`.
    fn join_at(&self, target: &str, k: usize, end: usize) -> Option<usize> {
        let mut joined = self.ext[k].clone();
        if !target.starts_with(joined.as_str()) {
            return None;
        }
        for j in (k + 1)..end.min(k + MAX_JOIN_TOKENS) {
            joined.push_str(&self.ext[j]);
            if joined == target {
                return Some(j);
            }
            if !target.starts_with(joined.as_str()) {
                return None;
            }
        }
        None
    }

    /// Patches when the token at `k` runs this lyric word together with the next one or two.
    fn split_at(&self, li: usize, wi: usize, k: usize) -> Option<Vec<WordPatch>> {
        let words = &self.lyric[li];
        let token = &self.ext[k];
        let mut joined = words[wi].clone();

        for extra in 1..=MAX_SPLIT_WORDS {
            let next = words.get(wi + extra)?;
            if next.is_empty() || !token.starts_with(joined.as_str()) {
                return None;
            }
            joined.push_str(next);
            if joined == *token {
                return Some(self.split_patches(li, wi, extra + 1, k));
            }
        }
        None
    }

    /// Spread one external token's time over `count` lyric words by character share.
    fn split_patches(&self, li: usize, wi: usize, count: usize, k: usize) -> Vec<WordPatch> {
        let words = &self.lyric[li][wi..wi + count];
        let total_chars: i64 = words.iter().map(|w| char_len(w)).sum::<i64>().max(1);
        let start = self.timings[k].start_ms;
        let duration = self.durations[k];

        let mut consumed = 0i64;
        words
            .iter()
            .enumerate()
            .map(|(offset, w)| {
                let chars = char_len(w);
                let patch = WordPatch {
                    line_index: li,
                    word_index: wi + offset,
                    start_ms: start + duration * consumed / total_chars,
                    duration_ms: duration * chars / total_chars,
                };
                consumed += chars;
                patch
            })
            .collect()
    }

    /// External tokens covered by existing patches of line `li`, recovered from their times.
    fn span_of(&self, li: usize, patches: &[WordPatch]) -> Option<(usize, usize)> {
        let starts = patches.iter().filter(|p| p.line_index == li).map(|p| p.start_ms);
        let earliest = starts.clone().min()?;
        let latest = starts.max()?;
        let first = self.timings.iter().position(|t| t.start_ms >= earliest)?;
        let last = self.timings.iter().rposition(|t| t.start_ms <= latest)?;
        Some((first, last.max(first)))
    }

    /// One patch spanning external tokens `first..=last`.
    fn patch(&self, li: usize, wi: usize, first: usize, last: usize) -> WordPatch {
        let start = self.timings[first].start_ms;
        let end = self.timings[last].start_ms + self.durations[last];
        WordPatch {
            line_index: li,
            word_index: wi,
            start_ms: start,
            duration_ms: (end - start).max(0),
        }
    }
}

#[allow(clippy::cast_possible_wrap)]
fn char_len(s: &str) -> i64 {
    s.chars().count() as i64
}

/// Duration of each external token: gap to the next token, capped.
fn infer_durations(timings: &[WordTiming], max_ms: i64) -> Vec<i64> {
    timings
        .iter()
        .enumerate()
        .map(|(i, w)| {
            timings
                .get(i + 1)
                .map_or(DEFAULT_WORD_DURATION_MS.min(max_ms), |next| {
                    (next.start_ms - w.start_ms).clamp(0, max_ms)
                })
        })
        .collect()
}

/// Align external word timings onto tokenized lyric lines.
///
/// Runs the primary forward pass followed by [`recover_unmatched_lines`].
pub fn align_words(
    lines: &[TokenizedLine],
    words: &[WordTiming],
    config: &EngineConfig,
) -> WordAlignment {
    let aligner = Aligner::new(lines, words, config);
    let mut alignment = WordAlignment {
        total_words: aligner.total_countable(),
        line_spans: vec![None; lines.len()],
        ..WordAlignment::default()
    };

    let mut cursor = 0usize;
    for li in 0..lines.len() {
        let m = aligner.match_line(li, cursor..aligner.ext.len(), config.lookahead_window);
        if let Some((_, last)) = m.span {
            cursor = last + 1;
            alignment.line_spans[li] = m.span;
            alignment.matched_words += m.patches.len();
            alignment.patches.extend(m.patches);
        }
    }

    tracing::debug!(
        "Primary word pass matched {}/{} words on {} lines",
        alignment.matched_words,
        alignment.total_words,
        alignment.matched_line_count()
    );

    recover_with(&aligner, alignment, config)
}

/// Retry lines that received no patches, searching only between the external
/// tokens used by their matched neighbours.
///
/// A recovered line is committed only when its matched-word ratio reaches
/// `config.recovery_min_match_ratio`.
pub fn recover_unmatched_lines(
    lines: &[TokenizedLine],
    words: &[WordTiming],
    alignment: WordAlignment,
    config: &EngineConfig,
) -> WordAlignment {
    let aligner = Aligner::new(lines, words, config);
    recover_with(&aligner, alignment, config)
}

#[allow(clippy::cast_precision_loss)]
fn recover_with(aligner: &Aligner<'_>, mut alignment: WordAlignment, config: &EngineConfig) -> WordAlignment {
    let line_count = aligner.lyric.len();
    alignment.line_spans.resize(line_count, None);
    let mut patched = vec![false; line_count];
    for p in &alignment.patches {
        if let Some(flag) = patched.get_mut(p.line_index) {
            *flag = true;
        }
    }
    for (li, span) in alignment.line_spans.iter_mut().enumerate() {
        if span.is_none() && patched[li] {
            *span = aligner.span_of(li, &alignment.patches);
        }
    }
    let mut recovered_lines = 0usize;

    for li in 0..line_count {
        if patched[li] || alignment.line_spans[li].is_some() {
            continue;
        }
        let countable = aligner.countable(li);
        if countable == 0 {
            continue;
        }

        let lo = alignment.line_spans[..li]
            .iter()
            .rev()
            .find_map(|s| s.map(|(_, last)| last + 1))
            .unwrap_or(0);
        let hi = alignment.line_spans[li + 1..]
            .iter()
            .find_map(|s| s.map(|(first, _)| first))
            .unwrap_or(aligner.ext.len());
        if lo >= hi {
            continue;
        }

        let m = aligner.match_line(li, lo..hi, hi - lo);
        let ratio = m.patches.len() as f64 / countable as f64;
        if m.patches.is_empty() || ratio < config.recovery_min_match_ratio {
            continue;
        }

        alignment.line_spans[li] = m.span;
        alignment.matched_words += m.patches.len();
        alignment.patches.extend(m.patches);
        recovered_lines += 1;
    }

    if recovered_lines > 0 {
        alignment.patches.sort_by_key(|p| (p.line_index, p.word_index));
        tracing::debug!("Recovery pass committed {recovered_lines} lines");
    }

    alignment
}
