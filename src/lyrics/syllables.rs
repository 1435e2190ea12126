//! Syllable joining for tablature word timings.
//!
//! Notation sources split sung words into syllables and mark continuation with
//! a trailing hyphen (`"de-" "struc-" "tion"`). Joining them up front lets the
//! word aligner compare whole words.

use crate::types::WordTiming;

/// Join hyphen-continued syllables into whole words.
///
/// Each joined word takes the start time of its first syllable. A dangling
/// continuation at the end of the input is flushed as-is.
pub fn join_syllables(words: &[WordTiming]) -> Vec<WordTiming> {
    let mut out: Vec<WordTiming> = Vec::with_capacity(words.len());
    let mut buf_text = String::new();
    let mut buf_start: Option<i64> = None;

    for w in words {
        let cleaned = w.text.trim();
        if cleaned.is_empty() {
            continue;
        }
        let start = *buf_start.get_or_insert(w.start_ms);

        if let Some(stem) = cleaned.strip_suffix('-').filter(|s| !s.is_empty()) {
            buf_text.push_str(stem);
            continue;
        }

        buf_text.push_str(cleaned);
        out.push(WordTiming::new(start, std::mem::take(&mut buf_text)));
        buf_start = None;
    }

    if let Some(start) = buf_start {
        if !buf_text.is_empty() {
            out.push(WordTiming::new(start, buf_text));
        }
    }

    out
}
