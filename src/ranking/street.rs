use crate::ranking::normalize::normalize;
use crate::ranking::similarity::{partial_ratio, round_score};

/// A street matches only when its partial ratio is strictly above this
pub const STREET_MATCH_CUTOFF: f64 = 90.0;

/// Street gate for groups whose query carries a street hint.
///
/// The hint is normalized once and reused for every candidate of the group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetMatcher {
    hint: String,
}

impl StreetMatcher {
    pub fn new(street_hint: &str) -> Self {
        Self {
            hint: normalize(street_hint),
        }
    }

    /// Normalized hint
    pub fn hint(&self) -> &str {
        &self.hint
    }

    /// Partial similarity between the hint and a raw candidate street
    pub fn similarity(&self, street: &str) -> f64 {
        let street = normalize(street);
        if self.hint.is_empty() || street.is_empty() {
            return 0.0;
        }
        round_score(partial_ratio(&self.hint, &street))
    }

    pub fn matches(&self, street: &str) -> bool {
        !self.hint.is_empty() && self.similarity(street) > STREET_MATCH_CUTOFF
    }
}
