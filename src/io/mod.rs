pub mod csv;
pub mod memory;

use crate::core::{Partition, Table};
use crate::error::Result;

pub use self::csv::{project_columns, CsvSink, CsvSource};
pub use memory::MemorySink;

/// Trait for input table providers
pub trait RecordSource {
    /// Load the whole input table; any failure is fatal for the run
    fn load(&self) -> Result<Table>;

    /// Get source name for logging
    fn name(&self) -> String;
}

/// Trait for output partition consumers.
///
/// Each partition is written at most once per run, independently of the
/// others.
pub trait RecordSink {
    /// Write one partition; `headers` already include the status column
    fn write_partition(
        &mut self,
        partition: Partition,
        headers: &[String],
        rows: &[Vec<String>],
    ) -> Result<()>;

    /// Human-readable destination of a partition
    fn destination(&self, partition: Partition) -> String;
}
