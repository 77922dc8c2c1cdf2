use serde::Serialize;
use std::collections::HashSet;

use crate::core::{Partition, Tier, TieredCandidate, STATUS_COLUMN};
use crate::resolver::GroupResolution;

/// Number of candidates per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub ok: usize,
    pub ok_dynamic: usize,
    pub review: usize,
    pub rejected: usize,
}

impl TierCounts {
    pub fn add(&mut self, tier: Tier) {
        match tier {
            Tier::Ok => self.ok += 1,
            Tier::OkDynamic => self.ok_dynamic += 1,
            Tier::Review => self.review += 1,
            Tier::Rejected => self.rejected += 1,
        }
    }

    pub fn merge(&mut self, other: &TierCounts) {
        self.ok += other.ok;
        self.ok_dynamic += other.ok_dynamic;
        self.review += other.review;
        self.rejected += other.rejected;
    }

    pub fn total(&self) -> usize {
        self.ok + self.ok_dynamic + self.review + self.rejected
    }
}

/// Collects tiered candidates into per-partition row buffers.
///
/// Each worker owns one; buffers are merged by concatenation, so merging in
/// group order keeps the output deterministic.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    confirmed: Vec<Vec<String>>,
    review: Vec<Vec<String>>,
    rejected: Vec<Vec<String>>,
    counts: TierCounts,
    scoring_errors: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn buffer_mut(&mut self, partition: Partition) -> &mut Vec<Vec<String>> {
        match partition {
            Partition::Confirmed => &mut self.confirmed,
            Partition::Review => &mut self.review,
            Partition::Rejected => &mut self.rejected,
        }
    }

    /// Add one candidate: original row plus its tier label
    pub fn push(&mut self, candidate: &TieredCandidate<'_>) {
        let mut row = Vec::with_capacity(candidate.record.fields.len() + 1);
        row.extend(candidate.record.fields.iter().cloned());
        row.push(candidate.tier.label().to_string());

        self.counts.add(candidate.tier);
        self.buffer_mut(candidate.tier.partition()).push(row);
    }

    /// Add every candidate of a resolved group
    pub fn extend(&mut self, resolution: &GroupResolution<'_>) {
        for candidate in &resolution.candidates {
            self.push(candidate);
        }
        self.scoring_errors += resolution.scoring_errors;
    }

    /// Append `other` after `self`
    pub fn merge(mut self, other: Aggregator) -> Aggregator {
        self.confirmed.extend(other.confirmed);
        self.review.extend(other.review);
        self.rejected.extend(other.rejected);
        self.counts.merge(&other.counts);
        self.scoring_errors += other.scoring_errors;
        self
    }

    /// Drop exact duplicate rows within each partition (first one wins)
    pub fn finish(self) -> Partitions {
        let mut duplicates_removed = 0;
        let mut dedup = |mut rows: Vec<Vec<String>>| {
            let before = rows.len();
            let mut seen = HashSet::with_capacity(before);
            rows.retain(|row| seen.insert(row.clone()));
            duplicates_removed += before - rows.len();
            rows
        };

        let confirmed = dedup(self.confirmed);
        let review = dedup(self.review);
        let rejected = dedup(self.rejected);

        if duplicates_removed > 0 {
            tracing::info!("🧹 Removed {} duplicate rows", duplicates_removed);
        }

        Partitions {
            confirmed,
            review,
            rejected,
            counts: self.counts,
            scoring_errors: self.scoring_errors,
            duplicates_removed,
        }
    }
}

/// The three output partitions of a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partitions {
    confirmed: Vec<Vec<String>>,
    review: Vec<Vec<String>>,
    rejected: Vec<Vec<String>>,
    pub counts: TierCounts,
    pub scoring_errors: usize,
    pub duplicates_removed: usize,
}

impl Partitions {
    /// Rows of one partition, each ending with the tier label
    pub fn rows(&self, partition: Partition) -> &[Vec<String>] {
        match partition {
            Partition::Confirmed => &self.confirmed,
            Partition::Review => &self.review,
            Partition::Rejected => &self.rejected,
        }
    }

    /// Partitions that have at least one row, in output order
    pub fn non_empty(&self) -> impl Iterator<Item = (Partition, &[Vec<String>])> + '_ {
        Partition::ALL
            .into_iter()
            .map(move |p| (p, self.rows(p)))
            .filter(|(_, rows)| !rows.is_empty())
    }
}

/// Input headers with the status column appended
pub fn output_headers(headers: &[String]) -> Vec<String> {
    let mut out = headers.to_vec();
    out.push(STATUS_COLUMN.to_string());
    out
}
