//! Domain layer - Batch records with no I/O
//!
//! This layer contains:
//! - Entities: Pokemon, WorkItem
//! - Value Objects: StatBlock, RollResult, Partition and identifiers
//! - Aggregates: BatchResult, the per-partition result collection

pub mod aggregates;
pub mod entities;
pub mod value_objects;
