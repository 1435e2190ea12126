//! Best-candidate selection over a set of lines.

use std::collections::HashMap;

use crate::lyrics::normalize::tokens;
use crate::matching::similarity::{jaccard, SimilarityScorer, TokenJaccard};

/// The winning candidate of a best-match search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch<'a, C> {
    /// Position of the candidate in the input slice.
    pub index: usize,
    /// The candidate itself.
    pub candidate: &'a C,
    /// Its similarity score.
    pub score: f64,
}

/// Find the candidate most similar to `text` using token Jaccard similarity.
///
/// Only scores strictly above `threshold` qualify; ties keep the earliest
/// candidate. Returns `None` when nothing qualifies or `text` has no tokens.
pub fn find_best_match<'a, C: AsRef<str>>(
    text: &str,
    candidates: &'a [C],
    threshold: f64,
) -> Option<BestMatch<'a, C>> {
    find_best_match_with(&TokenJaccard, text, candidates, threshold)
}

/// [`find_best_match`] with a caller-supplied scorer.
pub fn find_best_match_with<'a, C: AsRef<str>>(
    scorer: &dyn SimilarityScorer,
    text: &str,
    candidates: &'a [C],
    threshold: f64,
) -> Option<BestMatch<'a, C>> {
    if tokens(text).is_empty() {
        return None;
    }

    let mut best: Option<BestMatch<'a, C>> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let score = scorer.score(text, candidate.as_ref());
        if score <= threshold {
            continue;
        }
        if best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(BestMatch { index, candidate, score });
        }
    }
    best
}

/// Pre-tokenized candidate set for repeated lookups.
///
/// Candidates whose token set equals the query's are found through a hash
/// lookup; everything else falls back to a full scan. Results are identical
/// to [`find_best_match`].
#[derive(Debug, Clone, Default)]
pub struct CandidateIndex {
    tokens: Vec<Vec<String>>,
    by_token_set: HashMap<String, usize>,
}

impl CandidateIndex {
    /// Build an index over the given candidate texts.
    pub fn new<C: AsRef<str>>(candidates: &[C]) -> Self {
        let tokens: Vec<Vec<String>> = candidates.iter().map(|c| tokens(c.as_ref())).collect();
        let mut by_token_set = HashMap::new();
        for (i, t) in tokens.iter().enumerate() {
            if let Some(key) = token_set_key(t) {
                by_token_set.entry(key).or_insert(i);
            }
        }
        Self { tokens, by_token_set }
    }

    /// Number of indexed candidates.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the index holds no candidates.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Best candidate for `text` as `(index, score)`.
    pub fn best(&self, text: &str, threshold: f64) -> Option<(usize, f64)> {
        let query = tokens(text);
        let key = token_set_key(&query)?;

        // A perfect score can only be beaten by an earlier perfect score,
        // which the first-seen map already accounts for
        if threshold < 1.0 {
            if let Some(&index) = self.by_token_set.get(&key) {
                return Some((index, 1.0));
            }
        }

        let mut best: Option<(usize, f64)> = None;
        for (index, candidate) in self.tokens.iter().enumerate() {
            let score = jaccard(&query, candidate);
            if score > threshold && best.is_none_or(|(_, s)| score > s) {
                best = Some((index, score));
            }
        }
        best
    }
}

/// Canonical key for a token set: sorted, deduplicated, space-joined.
fn token_set_key(tokens: &[String]) -> Option<String> {
    if tokens.is_empty() {
        return None;
    }
    let mut sorted: Vec<&str> = tokens.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    Some(sorted.join(" "))
}
