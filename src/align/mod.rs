//! Timing alignment.
//!
//! Word-level alignment of an external timing source onto lyric lines, clock
//! offset recovery, and assignment of chord events to lines and words.

pub mod chords;
pub mod offset;
pub mod transform;
pub mod words;

pub use chords::{align_chords_to_lrc, align_chords_to_words};
pub use offset::{build_anchors, estimate_global_offset, select_transform};
pub use transform::apply_time_transform;
pub use words::{align_words, recover_unmatched_lines, WordAlignment};
