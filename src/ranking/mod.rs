pub mod normalize;
pub mod query;
pub mod similarity;
pub mod street;
pub mod title;

use crate::core::CandidateRecord;

pub use normalize::normalize;
pub use query::{Query, Scenario};
pub use street::{StreetMatcher, STREET_MATCH_CUTOFF};
pub use title::{try_score_candidate, try_score_title, TitleScore};

/// Candidate with its title score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub record: &'a CandidateRecord,
    pub score: f64,
}

impl<'a> ScoredCandidate<'a> {
    pub fn new(record: &'a CandidateRecord, score: f64) -> Self {
        Self { record, score }
    }
}

/// Indexes of `candidates` ordered by score descending; equal scores keep
/// their input order
pub fn rank_order(candidates: &[ScoredCandidate<'_>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        candidates[b]
            .score
            .partial_cmp(&candidates[a].score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}
