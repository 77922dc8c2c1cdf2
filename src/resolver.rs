//! Per-customer decision procedure.
//!
//! A group is resolved in isolation: its tiers depend only on its members
//! and the run-wide [`MatchConfig`].

use crate::config::MatchConfig;
use crate::core::record::TITLE_COLUMN;
use crate::core::{CandidateRecord, Tier, TieredCandidate};
use crate::ranking::{rank_order, try_score_candidate, Query, ScoredCandidate, StreetMatcher};

/// All candidates sharing one customer key, plus the parsed query
#[derive(Debug, Clone)]
pub struct Group<'a> {
    pub key: &'a str,
    pub query: Query,
    pub members: Vec<&'a CandidateRecord>,
}

impl<'a> Group<'a> {
    /// Build a group; the query comes from the first member's search string
    pub fn new(key: &'a str, members: Vec<&'a CandidateRecord>) -> Self {
        let query = members
            .first()
            .map(|m| Query::parse(&m.search_string))
            .unwrap_or_else(|| Query::parse(""));
        Self { key, query, members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Tiers of one group, in member order
#[derive(Debug, Clone, Default)]
pub struct GroupResolution<'a> {
    pub candidates: Vec<TieredCandidate<'a>>,
    /// Candidates whose score defaulted to 0
    pub scoring_errors: usize,
}

/// Score one candidate, falling back to 0 on failure
fn score_or_zero<'a>(
    key: &str,
    query: &Query,
    record: &'a CandidateRecord,
    errors: &mut usize,
) -> ScoredCandidate<'a> {
    match try_score_candidate(query, record) {
        Ok(score) => {
            tracing::trace!(
                customer = %key,
                title = %record.title,
                core = score.core,
                full = score.full,
                total = score.total,
                "Scored candidate"
            );
            ScoredCandidate::new(record, score.total)
        }
        Err(e) => {
            let value = if e.field() == TITLE_COLUMN {
                record.title.as_str()
            } else {
                query.core_name.as_str()
            };
            tracing::warn!(
                customer = %key,
                row = record.row,
                field = e.field(),
                value = %value,
                score = 0.0,
                "⚠️ Scoring failed, defaulting to 0: {}",
                e
            );
            *errors += 1;
            ScoredCandidate::new(record, 0.0)
        }
    }
}

/// Threshold and dynamic-gap decision over already scored candidates.
///
/// Returns one tier per input candidate, in input order.
pub fn classify_scored<'a>(
    scored: &[ScoredCandidate<'a>],
    config: &MatchConfig,
) -> Vec<TieredCandidate<'a>> {
    let tiers = decide(scored, config);
    scored
        .iter()
        .zip(tiers)
        .map(|(s, tier)| TieredCandidate::new(s.record, tier, Some(s.score)))
        .collect()
}

/// Slack for comparing blended scores, which carry one decimal
const SCORE_TOLERANCE: f64 = 1e-9;

fn decide(scored: &[ScoredCandidate<'_>], config: &MatchConfig) -> Vec<Tier> {
    let high: Vec<usize> = scored
        .iter()
        .enumerate()
        .filter(|(_, s)| s.score >= config.threshold - SCORE_TOLERANCE)
        .map(|(i, _)| i)
        .collect();

    if !high.is_empty() {
        let mut tiers = vec![Tier::Rejected; scored.len()];
        for i in high {
            tiers[i] = Tier::Ok;
        }
        return tiers;
    }

    if scored.len() < 2 {
        return vec![Tier::Review; scored.len()];
    }

    let order = rank_order(scored);
    let best = scored[order[0]].score;
    let runner_up = scored[order[1]].score;

    let gap = best - runner_up;

    // A positive tie never passes, whatever the configured gap
    if best > 0.0 && gap > SCORE_TOLERANCE && gap >= config.gap - SCORE_TOLERANCE {
        let mut tiers = vec![Tier::Rejected; scored.len()];
        tiers[order[0]] = Tier::OkDynamic;
        tiers
    } else {
        vec![Tier::Review; scored.len()]
    }
}

/// Resolve one customer's group into tiers.
pub fn resolve_group<'a>(group: &Group<'a>, config: &MatchConfig) -> GroupResolution<'a> {
    let mut errors = 0;

    if group.len() == 1 {
        return GroupResolution {
            candidates: vec![TieredCandidate::new(group.members[0], Tier::Ok, None)],
            scoring_errors: 0,
        };
    }

    let candidates = match group.query.street_hint.as_deref() {
        None => {
            let scored: Vec<ScoredCandidate<'a>> = group
                .members
                .iter()
                .map(|&m| score_or_zero(group.key, &group.query, m, &mut errors))
                .collect();
            classify_scored(&scored, config)
        }
        Some(hint) => {
            let matcher = StreetMatcher::new(hint);
            let (matches, mismatches): (Vec<usize>, Vec<usize>) = (0..group.len())
                .partition(|&i| matcher.matches(&group.members[i].street));

            tracing::debug!(
                customer = %group.key,
                hint = %matcher.hint(),
                matches = matches.len(),
                mismatches = mismatches.len(),
                "Street gate applied"
            );

            if matches.is_empty() {
                tracing::debug!(
                    customer = %group.key,
                    "No candidate matches the street hint, whole group goes to review"
                );
                group
                    .members
                    .iter()
                    .map(|&m| TieredCandidate::new(m, Tier::Review, None))
                    .collect()
            } else {
                let scored: Vec<ScoredCandidate<'a>> = matches
                    .iter()
                    .map(|&i| score_or_zero(group.key, &group.query, group.members[i], &mut errors))
                    .collect();

                let mut slots: Vec<Option<TieredCandidate<'a>>> = vec![None; group.len()];
                for (&i, tiered) in matches.iter().zip(classify_scored(&scored, config)) {
                    slots[i] = Some(tiered);
                }
                for &i in &mismatches {
                    slots[i] = Some(TieredCandidate::new(group.members[i], Tier::Rejected, None));
                }
                slots.into_iter().flatten().collect()
            }
        }
    };

    for c in &candidates {
        tracing::debug!(customer = %group.key, "{}", c.display());
    }

    GroupResolution {
        candidates,
        scoring_errors: errors,
    }
}
