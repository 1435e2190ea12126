//! Word-timed ("enhanced") LRC output.

use std::collections::HashMap;

use crate::align::transform::map_time;
use crate::lyrics::lrc::format_timestamp;
use crate::types::{LyricLine, TimeTransform, TokenizedLine, WordPatch};

/// Render lines as enhanced LRC, tagging every aligned word with its start.
///
/// Word times are mapped through `transform` into the LRC clock. Words without
/// a patch are written untagged.
///
/// ```text
/// [00:12.00] <00:12.05>Amazing <00:12.80>grace
/// ```
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn render_enhanced_lrc(
    lines: &[LyricLine],
    patches: &[WordPatch],
    transform: Option<&TimeTransform>,
) -> String {
    let starts: HashMap<(usize, usize), i64> = patches
        .iter()
        .map(|p| {
            let mapped = map_time(p.start_ms as f64, transform).round() as i64;
            ((p.line_index, p.word_index), mapped)
        })
        .collect();

    let mut out = String::new();
    for (li, line) in lines.iter().enumerate() {
        out.push('[');
        out.push_str(&format_timestamp(line.start_time_ms));
        out.push(']');

        for (wi, word) in TokenizedLine::from_line(line).words.iter().enumerate() {
            out.push(' ');
            if let Some(ms) = starts.get(&(li, wi)) {
                out.push('<');
                out.push_str(&format_timestamp(*ms));
                out.push('>');
            }
            out.push_str(word);
        }
        out.push('\n');
    }
    out
}
