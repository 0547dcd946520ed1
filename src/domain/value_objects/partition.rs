//! Partition - A contiguous, indexed slice of the batch input

use super::PartitionIndex;

/// A contiguous run of input records assigned to one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<T> {
    pub index: PartitionIndex,
    /// Position of the first record within the whole batch
    pub offset: usize,
    pub records: Vec<T>,
}

impl<T> Partition<T> {
    pub fn new(index: PartitionIndex, offset: usize, records: Vec<T>) -> Self {
        Self {
            index,
            offset,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
