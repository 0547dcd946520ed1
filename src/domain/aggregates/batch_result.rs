//! Batch Result Aggregate - Per-partition rolls collected during a run
//!
//! Every partition writes its rolls exactly once. The aggregate only yields
//! the flattened output once all partitions `0..N` are present, so output
//! order is decided by partition index and never by completion order.

use std::collections::BTreeMap;

use crate::domain::value_objects::{PartitionIndex, RollResult};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    #[error("Partition {0} reported results twice")]
    DuplicatePartition(PartitionIndex),

    #[error("Partition {index} is outside the batch of {partitions}")]
    UnknownPartition {
        index: PartitionIndex,
        partitions: usize,
    },

    #[error("Partition {0} never reported results")]
    MissingPartition(PartitionIndex),
}

/// Rolls keyed by partition index
#[derive(Debug, Clone)]
pub struct BatchResult {
    partitions: usize,
    rolls: BTreeMap<PartitionIndex, Vec<RollResult>>,
}

impl BatchResult {
    pub fn new(partitions: usize) -> Self {
        Self {
            partitions,
            rolls: BTreeMap::new(),
        }
    }

    /// Record the rolls for one partition
    pub fn insert(
        &mut self,
        index: PartitionIndex,
        rolls: Vec<RollResult>,
    ) -> Result<(), AggregateError> {
        if index.get() >= self.partitions {
            return Err(AggregateError::UnknownPartition {
                index,
                partitions: self.partitions,
            });
        }
        if self.rolls.contains_key(&index) {
            return Err(AggregateError::DuplicatePartition(index));
        }
        self.rolls.insert(index, rolls);
        Ok(())
    }

    /// Concatenate all partitions in ascending index order
    pub fn into_ordered(self) -> Result<Vec<RollResult>, AggregateError> {
        if let Some(missing) = (0..self.partitions)
            .map(PartitionIndex::new)
            .find(|index| !self.rolls.contains_key(index))
        {
            return Err(AggregateError::MissingPartition(missing));
        }

        Ok(self.rolls.into_values().flatten().collect())
    }
}
