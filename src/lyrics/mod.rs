//! Lyrics processing.
//!
//! Turns raw LRC text into timed lines, canonicalizes tokens for comparison,
//! and renders word-timed LRC back out.

pub mod enhanced;
pub mod lrc;
pub mod normalize;
pub mod syllables;

pub use lrc::{parse_lrc, parse_lrc_file, tokenize_lines};
pub use normalize::{normalize, normalize_word};
