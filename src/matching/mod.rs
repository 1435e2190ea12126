//! Fuzzy line matching.
//!
//! Similarity scoring and best-candidate selection, shared by baseline chord
//! lookup and anything else that needs to pair up lines across sources.

pub mod best_match;
pub mod similarity;

pub use best_match::{find_best_match, find_best_match_with, BestMatch, CandidateIndex};
pub use similarity::{similarity, SimilarityScorer, TokenJaccard};
