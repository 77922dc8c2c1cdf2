//! # Place Match
//!
//! Match scoring and tier classification for scraped place records:
//! - Text normalization for German/Swiss place names and streets
//! - Query parsing into core name and optional street hint
//! - Weighted title scoring with a street gate
//! - Per-customer threshold and dynamic-gap decisions
//! - Parallel group resolution, three-way CSV partitioning
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use place_match::{CsvSink, CsvSource, MatchConfig, MatchEngine};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let input = Path::new("places_optimierte_daten.csv");
//!     let engine = MatchEngine::new(MatchConfig::new(80.0, 15.0)?);
//!
//!     let report = engine.run(&CsvSource::new(input), &mut CsvSink::for_input(input))?;
//!
//!     println!("{}", report.display());
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod io;
pub mod ranking;
pub mod resolver;

// Re-export primary types
pub use aggregate::{Aggregator, Partitions, TierCounts};
pub use config::{FileConfig, MatchConfig};
pub use core::{CandidateRecord, Partition, Table, Tier, TieredCandidate};
pub use engine::{MatchEngine, RunReport};
pub use error::{MatchError, Result, ScoringError};
pub use io::{CsvSink, CsvSource, MemorySink, RecordSink, RecordSource};
pub use ranking::{normalize, Query, Scenario, StreetMatcher, TitleScore};
pub use resolver::{resolve_group, Group, GroupResolution};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
