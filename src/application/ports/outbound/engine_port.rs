//! Damage engine port - Interface to the external calculation engine
//!
//! The engine is a foreign process. This port keeps the orchestrator unaware
//! of how requests reach it (handoff files, stdin, or argv).

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::entities::WorkItem;
use crate::domain::value_objects::{PartitionIndex, RollResult};

/// Errors from a single engine invocation
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Failed to spawn engine '{command}'")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine exited with {status}: {stderr}")]
    NonZeroExit { status: String, stderr: String },

    #[error("Engine did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("Engine I/O failed on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Malformed engine response: {0}")]
    MalformedResponse(String),

    #[error("Engine returned {actual} results for {expected} requests")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Port for running damage calculations
#[async_trait]
pub trait DamageEnginePort: Send + Sync {
    /// Calculate rolls for every item of one partition.
    ///
    /// Returns one `RollResult` per item, in item order.
    async fn calculate(
        &self,
        partition: PartitionIndex,
        items: &[WorkItem],
    ) -> Result<Vec<RollResult>, EngineError>;

    /// Remove whatever per-partition artifacts the transport left behind
    async fn cleanup(&self, _partitions: &[PartitionIndex]) -> Result<(), EngineError> {
        Ok(())
    }
}
