//! LRC tokenizer.
//!
//! Parses time-tagged lyric blocks (`[mm:ss.xx] text`) into [`LyricLine`]s.
//! The parser is tolerant: metadata tags, blank lines and lines whose
//! timestamp cannot be read are skipped rather than reported.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::constants::chords::DEFAULT_LINE_DURATION_MS;
use crate::error::{Error, Result};
use crate::types::{LineId, LyricLine, TokenizedLine};

/// `mm:ss`, `mm:ss.x`, `mm:ss.xx` or `mm:ss.xxx` inside a tag.
#[allow(clippy::expect_used)]
static RE_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,3}):(\d{1,2})(?:[.:](\d{1,3}))?$").expect("valid regex: RE_TIMESTAMP")
});

/// Inline word tags of enhanced LRC, e.g. `<00:12.34>`.
#[allow(clippy::expect_used)]
static RE_WORD_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<\d{1,3}:\d{1,2}(?:[.:]\d{1,3})?>").expect("valid regex: RE_WORD_TAG")
});

#[allow(clippy::expect_used)]
static RE_SPACES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("valid regex: RE_SPACES")
});

/// Parse the inside of a time tag (`"01:02.50"`) into milliseconds.
pub fn parse_timestamp(tag: &str) -> Option<i64> {
    let caps = RE_TIMESTAMP.captures(tag.trim())?;
    let minutes: i64 = caps.get(1)?.as_str().parse().ok()?;
    let seconds: i64 = caps.get(2)?.as_str().parse().ok()?;
    if seconds >= 60 {
        return None;
    }

    let fraction_ms = match caps.get(3).map(|m| m.as_str()) {
        None => 0,
        Some(f) => {
            let value: i64 = f.parse().ok()?;
            match f.len() {
                1 => value * 100,
                2 => value * 10,
                _ => value,
            }
        }
    };

    Some(minutes * 60_000 + seconds * 1_000 + fraction_ms)
}

/// Format milliseconds as an LRC timecode (`mm:ss.cc`), rounding to centiseconds.
pub fn format_timestamp(ms: i64) -> String {
    let total_centis = (ms.max(0) + 5) / 10;
    let minutes = total_centis / 6000;
    let secs = (total_centis / 100) % 60;
    let centis = total_centis % 100;
    format!("{minutes:02}:{secs:02}.{centis:02}")
}

/// Split one raw line into its leading timestamps and remaining text.
///
/// Returns `None` for metadata, untagged and malformed lines.
fn split_tagged_line(raw: &str) -> Option<(Vec<i64>, String)> {
    let mut rest = raw.trim();
    let mut times = Vec::new();

    while let Some(after_open) = rest.strip_prefix('[') {
        let close = after_open.find(']')?;
        let tag = &after_open[..close];
        match parse_timestamp(tag) {
            Some(ms) => times.push(ms),
            // A non-time tag before any timestamp is metadata (`[ti:...]`) or junk
            None if times.is_empty() => return None,
            None => break,
        }
        rest = after_open[close + 1..].trim_start();
    }

    if times.is_empty() {
        return None;
    }

    let text = RE_WORD_TAG.replace_all(rest, " ");
    let text = RE_SPACES.replace_all(&text, " ").trim().to_string();
    Some((times, text))
}

/// Parse an LRC block into lyric lines, one per timestamp, in appearance order.
pub fn parse_lrc(content: &str) -> Vec<LyricLine> {
    let mut entries: Vec<(i64, String)> = Vec::new();
    let mut skipped = 0usize;

    for raw in content.lines() {
        if raw.trim().is_empty() {
            continue;
        }
        match split_tagged_line(raw) {
            Some((times, text)) => {
                entries.extend(times.into_iter().map(|t| (t, text.clone())));
            }
            None => skipped += 1,
        }
    }

    let lines: Vec<LyricLine> = entries
        .iter()
        .enumerate()
        .map(|(i, (start, text))| {
            let end = entries
                .get(i + 1)
                .map(|(next, _)| *next)
                .filter(|next| next > start)
                .unwrap_or(start + DEFAULT_LINE_DURATION_MS);
            LyricLine::new(LineId::for_index(i), text.clone(), *start, end)
        })
        .collect();

    tracing::debug!("Parsed {} lyric lines ({skipped} non-lyric lines skipped)", lines.len());
    lines
}

/// Read and parse an LRC file.
pub fn parse_lrc_file(path: &Path) -> Result<Vec<LyricLine>> {
    let content = fs_err::read_to_string(path)
        .map_err(|e| Error::io(e, Some(path.to_path_buf())))?;

    let lines = parse_lrc(&content);
    if lines.is_empty() && !content.trim().is_empty() {
        return Err(Error::parse("no timestamped lyric lines found", Some(path.to_path_buf())));
    }
    Ok(lines)
}

/// Split each line into display words.
pub fn tokenize_lines(lines: &[LyricLine]) -> Vec<TokenizedLine> {
    lines.iter().map(TokenizedLine::from_line).collect()
}
