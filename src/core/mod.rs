pub mod record;
pub mod tier;

pub use record::{CandidateRecord, Table, REQUIRED_COLUMNS};
pub use tier::{Partition, Tier, TieredCandidate, STATUS_COLUMN};
