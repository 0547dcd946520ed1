//! Roll writers - Output sinks for the ordered batch rolls
//!
//! The file writer stages the whole output next to the target and renames it
//! into place, so a failed run never leaves a half-written file behind.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::application::ports::outbound::{RollSinkPort, SinkError};
use crate::domain::value_objects::RollResult;

/// One output line: the roll values comma-joined, newline terminated
pub fn format_roll(roll: &RollResult) -> String {
    let values: Vec<String> = roll.values().iter().map(i64::to_string).collect();
    format!("{}\n", values.join(","))
}

fn render(rolls: &[RollResult]) -> String {
    rolls.iter().map(format_roll).collect()
}

/// Writes rolls to a CSV file, replacing any previous contents
#[derive(Debug, Clone)]
pub struct CsvRollWriter {
    path: PathBuf,
}

impl CsvRollWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

#[async_trait]
impl RollSinkPort for CsvRollWriter {
    async fn write_rolls(&self, rolls: &[RollResult]) -> Result<(), SinkError> {
        let staging = self.staging_path();
        if let Err(source) = tokio::fs::write(&staging, render(rolls)).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(SinkError::Io {
                path: staging,
                source,
            });
        }

        if let Err(source) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(SinkError::Io {
                path: self.path.clone(),
                source,
            });
        }

        tracing::info!(path = %self.path.display(), rolls = rolls.len(), "Rolls written");
        Ok(())
    }
}

/// Prints rolls to stdout (single matchup runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutRollWriter;

#[async_trait]
impl RollSinkPort for StdoutRollWriter {
    async fn write_rolls(&self, rolls: &[RollResult]) -> Result<(), SinkError> {
        let mut stdout = tokio::io::stdout();
        let to_sink_error = |source| SinkError::Io {
            path: PathBuf::from("<stdout>"),
            source,
        };
        stdout
            .write_all(render(rolls).as_bytes())
            .await
            .map_err(to_sink_error)?;
        stdout.flush().await.map_err(to_sink_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_roll() {
        assert_eq!(format_roll(&RollResult::new(vec![85, 86, 100])), "85,86,100\n");
        assert_eq!(format_roll(&RollResult::new(vec![7])), "7\n");
        assert_eq!(format_roll(&RollResult::default()), "\n");
    }

    #[tokio::test]
    async fn test_writes_fresh_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rolls.csv");
        std::fs::write(&path, "stale contents\nfrom an earlier run\nthat was longer\n").unwrap();

        let writer = CsvRollWriter::new(&path);
        writer
            .write_rolls(&[RollResult::new(vec![1, 2, 3]), RollResult::new(vec![4])])
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1,2,3\n4\n");
        assert!(!dir.path().join("rolls.csv.tmp").exists());
    }

    #[tokio::test]
    async fn test_unwritable_location() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CsvRollWriter::new(dir.path().join("missing").join("rolls.csv"));

        let err = writer.write_rolls(&[RollResult::new(vec![1])]).await.unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
        assert!(!dir.path().join("missing").exists());
    }

    #[tokio::test]
    async fn test_failed_rename_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("rolls.csv");
        // a non-empty directory in the way makes the rename fail after staging succeeded
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep.txt"), "x").unwrap();

        let writer = CsvRollWriter::new(&target);
        let err = writer.write_rolls(&[RollResult::new(vec![1])]).await.unwrap_err();
        assert!(matches!(err, SinkError::Io { ref path, .. } if *path == target));
        assert!(!dir.path().join("rolls.csv.tmp").exists());
        assert!(target.join("keep.txt").exists());
    }
}
