use std::collections::BTreeMap;

use crate::core::Partition;
use crate::error::{MatchError, Result};
use crate::io::RecordSink;

/// Written partition held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryPartition {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Sink keeping every written partition in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    partitions: BTreeMap<Partition, MemoryPartition>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, partition: Partition) -> Option<&MemoryPartition> {
        self.partitions.get(&partition)
    }

    /// Partitions written so far, in output order
    pub fn written(&self) -> Vec<Partition> {
        self.partitions.keys().copied().collect()
    }
}

impl RecordSink for MemorySink {
    fn write_partition(
        &mut self,
        partition: Partition,
        headers: &[String],
        rows: &[Vec<String>],
    ) -> Result<()> {
        if self.partitions.contains_key(&partition) {
            return Err(MatchError::Write {
                partition: partition.to_string(),
                message: "partition already written in this run".to_string(),
            });
        }
        self.partitions.insert(
            partition,
            MemoryPartition {
                headers: headers.to_vec(),
                rows: rows.to_vec(),
            },
        );
        Ok(())
    }

    fn destination(&self, partition: Partition) -> String {
        format!("memory://{}", partition)
    }
}
