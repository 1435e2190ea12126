//! `chordsync` - timing alignment and chord enhancement for lyric teleprompters.
//!
//! Takes timestamped LRC lyrics, an independently tokenized external timing
//! source (words and chords from a tablature or notation file), and optionally
//! a curated chord patch, and produces a per-line chord overlay in the lyrics'
//! own clock.
//!
//! The usual entry point is [`engine::ChordEnhancer`]; the individual stages
//! live in [`lyrics`], [`matching`], [`align`], [`merge`] and [`transpose`].

pub mod align;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod lyrics;
pub mod matching;
pub mod merge;
pub mod payload;
pub mod transpose;
pub mod types;

pub use engine::{ChordEnhancer, EnhancementResult};
pub use error::{Error, Result};
