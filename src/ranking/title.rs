use serde::Serialize;

use crate::core::record::{SEARCH_STRING_COLUMN, TITLE_COLUMN};
use crate::core::CandidateRecord;
use crate::error::ScoringError;
use crate::ranking::normalize::normalize;
use crate::ranking::query::Query;
use crate::ranking::similarity::{ratio, round_score, token_set_ratio};

/// Weight of the first-token similarity, in tenths
pub const CORE_WEIGHT_TENTHS: f64 = 7.0;

/// Weight of the whole-title token-set similarity, in tenths
pub const FULL_WEIGHT_TENTHS: f64 = 3.0;

/// Blend whole-point components into the title score.
///
/// The weighted sum is an exact integer in tenths; dividing once keeps
/// e.g. `0.7 * 92 + 0.3 * 52` at exactly 80.
pub fn blend(core: f64, full: f64) -> f64 {
    (CORE_WEIGHT_TENTHS * core + FULL_WEIGHT_TENTHS * full) / 10.0
}

/// Title score with its components
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TitleScore {
    /// Ratio between the first tokens of core name and title
    pub core: f64,
    /// Token-set ratio between the full strings
    pub full: f64,
    /// `0.7 * core + 0.3 * full`, see [`blend`]
    pub total: f64,
}

fn checked_normalize(text: &str, field: &'static str) -> Result<String, ScoringError> {
    if text.contains(char::REPLACEMENT_CHARACTER) {
        return Err(ScoringError::InvalidEncoding { field });
    }
    let normalized = normalize(text);
    if normalized.is_empty() {
        return Err(ScoringError::EmptyField { field });
    }
    Ok(normalized)
}

/// Score a title against the query's core name.
///
/// Fails when either side is empty after normalization or carries bytes
/// that were not valid UTF-8.
pub fn try_score_title(query: &Query, title: &str) -> Result<TitleScore, ScoringError> {
    let core_name = checked_normalize(&query.core_name, SEARCH_STRING_COLUMN)?;
    let title = checked_normalize(title, TITLE_COLUMN)?;

    // Both are non-empty after normalization, so each has a first token
    let core_token = core_name.split(' ').next().unwrap_or_default();
    let title_token = title.split(' ').next().unwrap_or_default();

    let core = round_score(ratio(core_token, title_token));
    let full = round_score(token_set_ratio(&core_name, &title));

    Ok(TitleScore {
        core,
        full,
        total: blend(core, full),
    })
}

/// Convenience wrapper taking a whole candidate record
pub fn try_score_candidate(
    query: &Query,
    candidate: &CandidateRecord,
) -> Result<TitleScore, ScoringError> {
    try_score_title(query, &candidate.title)
}
