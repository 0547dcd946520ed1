//! Aggregates - Cluster of domain objects treated as a single unit

pub mod batch_result;

pub use batch_result::{AggregateError, BatchResult};
