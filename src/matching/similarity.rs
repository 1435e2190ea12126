//! Similarity scoring between two lines of text.

use std::collections::HashSet;

use crate::lyrics::normalize::tokens;

/// Trait for line similarity scorers.
///
/// Implementations must be symmetric and return values in `[0, 1]`.
pub trait SimilarityScorer: Send + Sync {
    /// Score how alike two strings are.
    fn score(&self, a: &str, b: &str) -> f64;

    /// Get the name of this scorer (for debugging/logging).
    fn name(&self) -> &'static str;
}

/// Jaccard index over the sets of normalized tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenJaccard;

impl SimilarityScorer for TokenJaccard {
    fn score(&self, a: &str, b: &str) -> f64 {
        similarity(a, b)
    }

    fn name(&self) -> &'static str {
        "TokenJaccard"
    }
}

/// Token-set Jaccard similarity of `a` and `b`.
///
/// Duplicate words do not inflate the score. Returns 0 when either side has
/// no tokens after normalization.
pub fn similarity(a: &str, b: &str) -> f64 {
    let tokens_a = tokens(a);
    let tokens_b = tokens(b);
    jaccard(&tokens_a, &tokens_b)
}

/// Jaccard index of two pre-tokenized lists, treated as sets.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn jaccard(a: &[String], b: &[String]) -> f64 {
    let set_a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = b.iter().map(String::as_str).collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.len() + set_b.len() - intersection;
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn identical_text_scores_one() {
        for s in ["Hello world", "a", "The sun, the SUN!"] {
            assert!((similarity(s, s) - 1.0).abs() < f64::EPSILON, "{s}");
        }
    }

    #[test]
    fn disjoint_text_scores_zero() {
        assert!(similarity("hello world", "goodbye moon").abs() < f64::EPSILON);
    }

    #[test]
    fn empty_text_scores_zero() {
        assert!(similarity("", "anything").abs() < f64::EPSILON);
        assert!(similarity("anything", "").abs() < f64::EPSILON);
        assert!(similarity("!!!", "!!!").abs() < f64::EPSILON);
    }

    #[test]
    fn duplicates_do_not_inflate() {
        // {la} vs {la, di}
        let score = similarity("la la la la", "la di");
        assert!((score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn symmetric_and_normalized() {
        let a = "Hello, darkness my old friend";
        let b = "hello darkness, my OLD buddy";
        assert!((similarity(a, b) - similarity(b, a)).abs() < f64::EPSILON);
        // 4 shared of 6 distinct
        assert!((similarity(a, b) - 4.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn scorer_trait_delegates() {
        let scorer = TokenJaccard;
        assert_eq!(scorer.name(), "TokenJaccard");
        assert!((scorer.score("a b", "a b") - 1.0).abs() < f64::EPSILON);
    }
}
