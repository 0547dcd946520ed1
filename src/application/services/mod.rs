//! Application services - Batch use case implementations
//!
//! Each service depends on ports only, never on infrastructure types.

pub mod batch_orchestrator;
pub mod partitioner;
pub mod record_normalizer;

pub use batch_orchestrator::{BatchOptions, BatchOrchestrator};
pub use partitioner::data_rows;
pub use record_normalizer::parse_paste;
