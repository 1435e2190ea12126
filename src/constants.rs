//! Engine constants.
//!
//! Fixed values that define the engine's observable behavior. Thresholds that
//! were tuned empirically and may reasonably vary live in [`crate::config`].

/// Chord windowing constants.
pub mod chords {
    /// Inclusion tolerance around a line's window, in milliseconds.
    pub const LINE_TOLERANCE_MS: f64 = 300.0;

    /// Maximum number of chord entries kept per lyric line.
    pub const MAX_CHORDS_PER_LINE: usize = 4;

    /// Window length for the last line, which has no successor.
    pub const DEFAULT_LINE_DURATION_MS: i64 = 10_000;
}

/// Word alignment constants.
pub mod words {
    /// Maximum consecutive external tokens joined to match one lyric word.
    pub const MAX_JOIN_TOKENS: usize = 5;

    /// Maximum following lyric words one external token may absorb when it
    /// concatenates several lyric words.
    pub const MAX_SPLIT_WORDS: usize = 2;

    /// Duration assigned to the final external word, which has no successor.
    pub const DEFAULT_WORD_DURATION_MS: i64 = 500;
}

/// Fuzzy line matching constants.
pub mod matching {
    /// Default Jaccard threshold a candidate must exceed to be a match.
    pub const DEFAULT_THRESHOLD: f64 = 0.5;
}

/// Payload versioning constants.
pub mod payload {
    /// Serialization layout revision of `ChordEnhancementPayload`.
    pub const FORMAT_VERSION: u32 = 1;

    /// Alignment algorithm revision; bump whenever output for the same input changes.
    pub const ALGO_VERSION: u32 = 3;
}
