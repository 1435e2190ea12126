//! End-to-end chord enhancement.
//!
//! Ties the stages together: tokenize the lyric lines, join syllables in the
//! external timing, align words, pick a clock transform, then place chords on
//! lines (and on words, when word timing is available).

use crate::align::chords::{align_chords_to_lrc, align_chords_to_words};
use crate::align::offset::select_transform;
use crate::align::words::{align_words, WordAlignment};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::lyrics::lrc::{parse_lrc, tokenize_lines};
use crate::lyrics::syllables::join_syllables;
use crate::types::{ChordEnhancementPayload, ChordEvent, LyricLine, TrackInfo, WordTiming};

/// Output of one enhancement run.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancementResult {
    /// The chord overlay, ready to serialize.
    pub payload: ChordEnhancementPayload,
    /// Lines with at least one chord over lines with at least one word.
    pub coverage: f64,
    /// Word-level alignment the chords were attached through.
    pub word_alignment: WordAlignment,
}

/// Runs the alignment pipeline with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct ChordEnhancer {
    config: EngineConfig,
}

impl ChordEnhancer {
    /// Create an enhancer with the given thresholds.
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Create an enhancer configured from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(EngineConfig::load()?))
    }

    /// Active configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build a chord overlay for `lines`.
    ///
    /// # Arguments
    /// * `lines` - Lyric lines in the LRC clock
    /// * `words` - External word or syllable timings; may be empty
    /// * `chords` - External chord events
    /// * `track` - Which source track supplied the timing, recorded in the payload
    ///
    /// Without usable word timing there is no transform and chords are placed
    /// by line only.
    pub fn enhance(
        &self,
        lines: &[LyricLine],
        words: &[WordTiming],
        chords: &[ChordEvent],
        track: Option<TrackInfo>,
    ) -> EnhancementResult {
        let tokenized = tokenize_lines(lines);
        let joined = join_syllables(words);
        let word_alignment = align_words(&tokenized, &joined, &self.config);
        let transform = select_transform(lines, &word_alignment.patches, &self.config);

        let enhanced = if word_alignment.patches.is_empty() {
            align_chords_to_lrc(chords, lines, transform.as_ref())
        } else {
            align_chords_to_words(chords, lines, &word_alignment.patches, transform.as_ref())
        };

        let lines_with_words: Vec<bool> = tokenized.iter().map(|t| !t.words.is_empty()).collect();
        let worded = lines_with_words.iter().filter(|w| **w).count();
        let chorded = enhanced
            .iter()
            .filter(|l| lines_with_words.get(l.idx).copied().unwrap_or(false))
            .count();
        #[allow(clippy::cast_precision_loss)]
        let coverage = if worded == 0 { 0.0 } else { chorded as f64 / worded as f64 };

        let mut payload = ChordEnhancementPayload::new(enhanced);
        payload.time_transform = transform;
        payload.track = track;

        tracing::info!(
            "Enhanced {} lines: {chorded}/{worded} with chords, word coverage {:.0}%",
            lines.len(),
            word_alignment.coverage() * 100.0
        );

        EnhancementResult { payload, coverage, word_alignment }
    }

    /// Parse LRC text and enhance it.
    pub fn enhance_lrc(
        &self,
        lrc: &str,
        words: &[WordTiming],
        chords: &[ChordEvent],
        track: Option<TrackInfo>,
    ) -> (Vec<LyricLine>, EnhancementResult) {
        let lines = parse_lrc(lrc);
        let result = self.enhance(&lines, words, chords, track);
        (lines, result)
    }
}
