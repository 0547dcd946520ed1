//! Roll sink port - Where the ordered batch output goes

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::value_objects::RollResult;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait RollSinkPort: Send + Sync {
    /// Write the complete, ordered output of a run
    async fn write_rolls(&self, rolls: &[RollResult]) -> Result<(), SinkError>;
}
