use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::CandidateRecord;

/// Header of the column appended to every output partition
pub const STATUS_COLUMN: &str = "Status";

/// Classification outcome of one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    /// Confident match (singleton group or score at/above threshold)
    Ok,
    /// Sole winner by the dynamic threshold gap
    OkDynamic,
    /// Ambiguous, needs manual review
    Review,
    /// Not the customer's place
    Rejected,
}

impl Tier {
    /// Value written into the `Status` column
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Ok => "OK",
            Tier::OkDynamic => "OK (Dynamischer Schwellenwert)",
            Tier::Review => "Zur Prüfung",
            Tier::Rejected => "Aussortiert",
        }
    }

    /// Output partition this tier is written to
    pub fn partition(&self) -> Partition {
        match self {
            Tier::Ok | Tier::OkDynamic => Partition::Confirmed,
            Tier::Review => Partition::Review,
            Tier::Rejected => Partition::Rejected,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.partition() == Partition::Confirmed
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Ok => "OK",
            Tier::OkDynamic => "OK_DYNAMIC",
            Tier::Review => "REVIEW",
            Tier::Rejected => "REJECTED",
        };
        f.write_str(name)
    }
}

/// One of the three output streams of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    Confirmed,
    Review,
    Rejected,
}

impl Partition {
    pub const ALL: [Partition; 3] = [Partition::Confirmed, Partition::Review, Partition::Rejected];

    /// File name suffix used by the CSV sink
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Partition::Confirmed => "eindeutig",
            Partition::Review => "zur_pruefung",
            Partition::Rejected => "aussortiert",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Partition::Confirmed => "confirmed",
            Partition::Review => "review",
            Partition::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Candidate with its assigned tier.
///
/// `score` is `None` whenever the resolver decided without scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct TieredCandidate<'a> {
    pub record: &'a CandidateRecord,
    pub tier: Tier,
    pub score: Option<f64>,
}

impl<'a> TieredCandidate<'a> {
    pub fn new(record: &'a CandidateRecord, tier: Tier, score: Option<f64>) -> Self {
        Self { record, tier, score }
    }

    /// Get display string for logging
    pub fn display(&self) -> String {
        match self.score {
            Some(score) => format!("{} - {:.1} [{}]", self.record.title, score, self.tier),
            None => format!("{} [{}]", self.record.title, self.tier),
        }
    }
}
