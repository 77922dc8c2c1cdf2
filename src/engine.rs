use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

use crate::aggregate::{output_headers, Aggregator, Partitions, TierCounts};
use crate::config::MatchConfig;
use crate::core::{CandidateRecord, Partition, Table, Tier, TieredCandidate};
use crate::error::{MatchError, Result};
use crate::io::{RecordSink, RecordSource};
use crate::resolver::{resolve_group, Group};

/// Main match engine orchestrator
#[derive(Debug, Clone)]
pub struct MatchEngine {
    config: MatchConfig,
    workers: Option<usize>,
}

/// Outcome of classifying one table
#[derive(Debug, Clone)]
pub struct Classification {
    pub partitions: Partitions,
    pub groups: usize,
    /// Records without a customer key, routed to review
    pub unkeyed: usize,
}

/// Partition handed to the sink
#[derive(Debug, Clone, Serialize)]
pub struct WrittenPartition {
    pub partition: Partition,
    pub destination: String,
    pub rows: usize,
}

/// Partition the sink failed to write
#[derive(Debug, Clone, Serialize)]
pub struct FailedPartition {
    pub partition: Partition,
    pub destination: String,
    pub error: String,
}

/// Summary of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub source: String,
    pub config: MatchConfig,
    pub records: usize,
    pub groups: usize,
    pub unkeyed: usize,
    pub tiers: TierCounts,
    pub scoring_errors: usize,
    pub duplicates_removed: usize,
    pub written: Vec<WrittenPartition>,
    pub failed: Vec<FailedPartition>,
    pub latency_ms: f64,
}

impl RunReport {
    /// Every non-empty partition reached the sink
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Get display string for logging
    pub fn display(&self) -> String {
        format!(
            "{} records in {} groups: {} OK, {} OK (dynamic), {} review, {} rejected ({:.2}ms)",
            self.records,
            self.groups,
            self.tiers.ok,
            self.tiers.ok_dynamic,
            self.tiers.review,
            self.tiers.rejected,
            self.latency_ms
        )
    }
}

impl MatchEngine {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            workers: None,
        }
    }

    /// Resolve groups on a dedicated pool of `workers` threads
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Partition the table on customer key, ordered by first appearance.
    ///
    /// Records with a blank key are returned separately.
    pub fn group<'a>(&self, table: &'a Table) -> (Vec<Group<'a>>, Vec<&'a CandidateRecord>) {
        let mut index: HashMap<&'a str, usize> = HashMap::new();
        let mut buckets: Vec<(&'a str, Vec<&'a CandidateRecord>)> = Vec::new();
        let mut unkeyed = Vec::new();

        for record in table.records() {
            if !record.has_customer_key() {
                unkeyed.push(record);
                continue;
            }
            let key = record.customer_key.as_str();
            match index.get(key) {
                Some(&i) => buckets[i].1.push(record),
                None => {
                    index.insert(key, buckets.len());
                    buckets.push((key, vec![record]));
                }
            }
        }

        let groups = buckets
            .into_iter()
            .map(|(key, members)| Group::new(key, members))
            .collect();

        (groups, unkeyed)
    }

    /// Resolve every group and aggregate the tiers
    pub fn classify(&self, table: &Table) -> Result<Classification> {
        let (groups, unkeyed) = self.group(table);
        tracing::debug!("Formed {} groups from {} records", groups.len(), table.len());

        let resolve = || {
            groups
                .par_iter()
                .fold(Aggregator::new, |mut agg, group| {
                    agg.extend(&resolve_group(group, &self.config));
                    agg
                })
                .reduce(Aggregator::new, Aggregator::merge)
        };

        let mut aggregator = match self.workers {
            Some(workers) => rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|e| MatchError::Config(format!("Cannot start worker pool: {}", e)))?
                .install(resolve),
            None => resolve(),
        };

        for record in &unkeyed {
            tracing::warn!(
                row = record.row,
                title = %record.title,
                "⚠️ Record without customer key, sending to review"
            );
            aggregator.push(&TieredCandidate::new(record, Tier::Review, None));
        }

        Ok(Classification {
            partitions: aggregator.finish(),
            groups: groups.len(),
            unkeyed: unkeyed.len(),
        })
    }

    /// Load, classify, and write one run
    pub fn run(&self, source: &dyn RecordSource, sink: &mut dyn RecordSink) -> Result<RunReport> {
        let started_at = Utc::now();
        let start = Instant::now();

        let table = source.load().map_err(|e| {
            tracing::error!("❌ Cannot load '{}': {}", source.name(), e);
            e
        })?;

        tracing::info!(
            "🔍 Classifying {} records (threshold {}, gap {})",
            table.len(),
            self.config.threshold,
            self.config.gap
        );
        let classification = self.classify(&table)?;
        let partitions = &classification.partitions;
        let headers = output_headers(table.headers());

        let mut written = Vec::new();
        let mut failed = Vec::new();
        for (partition, rows) in partitions.non_empty() {
            let destination = sink.destination(partition);
            match sink.write_partition(partition, &headers, rows) {
                Ok(()) => written.push(WrittenPartition {
                    partition,
                    destination,
                    rows: rows.len(),
                }),
                Err(e) => {
                    tracing::error!("❌ Failed to write {} partition: {}", partition, e);
                    failed.push(FailedPartition {
                        partition,
                        destination,
                        error: e.to_string(),
                    });
                }
            }
        }

        let report = RunReport {
            started_at,
            source: source.name(),
            config: self.config,
            records: table.len(),
            groups: classification.groups,
            unkeyed: classification.unkeyed,
            tiers: partitions.counts,
            scoring_errors: partitions.scoring_errors,
            duplicates_removed: partitions.duplicates_removed,
            written,
            failed,
            latency_ms: start.elapsed().as_secs_f64() * 1000.0,
        };

        if report.is_success() {
            tracing::info!("✅ {}", report.display());
        } else {
            tracing::warn!("⚠️ {} ({} partition writes failed)", report.display(), report.failed.len());
        }

        Ok(report)
    }
}
