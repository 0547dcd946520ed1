//! Partitioner - Balanced contiguous split of the batch input
//!
//! With `L` records and `N` partitions, the first `L mod N` partitions get
//! `ceil(L / N)` records and the rest get `floor(L / N)`. Partitions are laid
//! out in input order, so concatenating them by index gives back the input.

use crate::domain::value_objects::{Partition, PartitionIndex};

/// Split `records` into exactly `count` contiguous partitions.
///
/// A `count` of zero is treated as one. When there are fewer records than
/// partitions, the trailing partitions are empty.
pub fn partition<T>(records: Vec<T>, count: usize) -> Vec<Partition<T>> {
    let count = count.max(1);
    let base = records.len() / count;
    let larger = records.len() % count;

    let mut remaining = records.into_iter();
    let mut offset = 0;
    (0..count)
        .map(|index| {
            let size = base + usize::from(index < larger);
            let chunk: Vec<T> = remaining.by_ref().take(size).collect();
            let partition = Partition::new(PartitionIndex::new(index), offset, chunk);
            offset += size;
            partition
        })
        .collect()
}

/// Data rows of a delimited table: the header line and blank lines are dropped
pub fn data_rows(contents: &str) -> Vec<String> {
    contents
        .split('\n')
        .skip(1)
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
