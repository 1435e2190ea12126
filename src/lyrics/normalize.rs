//! Token canonicalization for cross-source comparison.
//!
//! Two levels are provided. [`normalize`] is the line-level form used by the
//! similarity scorer: lowercase, punctuation removed, whitespace collapsed.
//! [`normalize_word`] builds on it for single tokens coming from tablature
//! sources, which carry prolongation markers, `+` annotations and freely
//! spelled vocalese.

use std::sync::LazyLock;

use regex::Regex;

/// ASCII punctuation plus the typographic quotes lyric sites love.
#[allow(clippy::expect_used)]
static RE_PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[[:punct:]‘’‚‛“”„‟…]").expect("valid regex: RE_PUNCTUATION")
});

/// Dashes that separate words rather than join them.
#[allow(clippy::expect_used)]
static RE_DASHES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[–—―]").expect("valid regex: RE_DASHES")
});

#[allow(clippy::expect_used)]
static RE_SPACES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("valid regex: RE_SPACES")
});

/// Prolongation markers such as `lo(o)ve` or `go(o)`.
#[allow(clippy::expect_used)]
static RE_PROLONGATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\([aeiouy]{1,3}\)").expect("valid regex: RE_PROLONGATION")
});

/// Trailing `+suffix` annotations.
#[allow(clippy::expect_used)]
static RE_PLUS_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+.*$").expect("valid regex: RE_PLUS_SUFFIX")
});

/// Interjection spellings and the canonical token each folds to.
#[allow(clippy::expect_used)]
static INTERJECTIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"^o+h*$", "oh"),
        (r"^(?:w+h*o+a+h*|w+o+a+h*)$", "whoa"),
        (r"^a+h+$", "ah"),
        (r"^(?:y+e+a+h+|y+e+h+)$", "yeah"),
        (r"^m+h*m+$", "mm"),
        (r"^h+e+y+$", "hey"),
        (r"^u+h+$", "uh"),
    ]
    .into_iter()
    .map(|(pattern, canonical)| {
        (Regex::new(pattern).expect("valid regex: INTERJECTIONS"), canonical)
    })
    .collect()
});

/// Canonicalize text for comparison.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let s = RE_DASHES.replace_all(&lower, " ");
    let s = RE_PUNCTUATION.replace_all(&s, "");
    let s = RE_SPACES.replace_all(&s, " ");
    s.trim().to_string()
}

/// Canonicalize a single word for word-level alignment.
///
/// Strips prolongation markers and `+` annotations, applies [`normalize`],
/// drops any remaining spaces, and folds interjection variants.
pub fn normalize_word(word: &str) -> String {
    let s = RE_PROLONGATION.replace_all(word, "");
    let s = RE_PLUS_SUFFIX.replace(&s, "");
    let mut s = normalize(&s);
    s.retain(|c| !c.is_whitespace());
    fold_interjection(&s).map_or(s, str::to_string)
}

/// Canonical form of an interjection, if the token is one.
pub fn fold_interjection(token: &str) -> Option<&'static str> {
    if token.is_empty() {
        return None;
    }
    INTERJECTIONS
        .iter()
        .find(|(re, _)| re.is_match(token))
        .map(|(_, canonical)| *canonical)
}

/// Normalized whitespace-delimited tokens of `text`.
pub fn tokens(text: &str) -> Vec<String> {
    normalize(text).split(' ').filter(|t| !t.is_empty()).map(String::from).collect()
}
