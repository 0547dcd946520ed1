//! Damage engine adapter - Runs the calculation engine as a child process
//!
//! One process is started per partition. The request is the JSON array of
//! [`CalcRequestDto`]; the response is read back according to the configured
//! [`TransportKind`].

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::application::dto::{CalcRequestDto, CalcResponseDto};
use crate::application::ports::outbound::{DamageEnginePort, EngineError};
use crate::domain::entities::WorkItem;
use crate::domain::value_objects::{PartitionIndex, RollResult};
use crate::infrastructure::config::{EngineConfig, TransportKind};

const STDERR_PREVIEW_CHARS: usize = 2_000;
const RESPONSE_PREVIEW_CHARS: usize = 500;

/// Client for the external damage engine
#[derive(Debug, Clone)]
pub struct EngineProcessClient {
    command: String,
    args: Vec<String>,
    work_dir: PathBuf,
    transport: TransportKind,
    timeout: Option<Duration>,
}

impl EngineProcessClient {
    pub fn new(command: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            work_dir: work_dir.into(),
            transport: TransportKind::File,
            timeout: None,
        }
    }

    pub fn from_config(engine: &EngineConfig, work_dir: &Path) -> Self {
        let client = Self::new(engine.command.clone(), work_dir)
            .with_args(engine.args.clone())
            .with_transport(engine.transport);
        match engine.timeout() {
            Some(limit) => client.with_timeout(limit),
            None => client,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Handoff file the request is written to (file transport)
    pub fn request_path(&self, partition: PartitionIndex) -> PathBuf {
        self.work_dir.join(format!("data-{partition}.json"))
    }

    /// Handoff file the engine writes its response to (file transport)
    pub fn response_path(&self, partition: PartitionIndex) -> PathBuf {
        self.work_dir.join(format!("output-{partition}.json"))
    }

    async fn call_with_files(
        &self,
        partition: PartitionIndex,
        payload: &str,
    ) -> Result<Vec<u8>, EngineError> {
        let request_path = self.request_path(partition);
        let response_path = self.response_path(partition);

        remove_if_present(&response_path).await?;
        tokio::fs::write(&request_path, payload)
            .await
            .map_err(|source| EngineError::Io {
                path: request_path.clone(),
                source,
            })?;

        let stdout = self.execute(Some(partition.to_string()), None).await?;
        if !stdout.is_empty() {
            tracing::debug!(
                partition = %partition,
                stdout = %String::from_utf8_lossy(&stdout).trim(),
                "Engine output"
            );
        }

        tokio::fs::read(&response_path)
            .await
            .map_err(|source| EngineError::Io {
                path: response_path,
                source,
            })
    }

    /// Run the engine once and return its stdout
    async fn execute(
        &self,
        extra_arg: Option<String>,
        stdin: Option<&[u8]>,
    ) -> Result<Vec<u8>, EngineError> {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args);
        if let Some(arg) = extra_arg {
            cmd.arg(arg);
        }
        cmd.current_dir(&self.work_dir)
            .kill_on_drop(true)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| EngineError::Spawn {
            command: self.command.clone(),
            source,
        })?;

        // Feed stdin while collecting output so a chatty engine cannot block on a full pipe
        let pipe = child.stdin.take();
        let feed = async move {
            if let (Some(mut pipe), Some(payload)) = (pipe, stdin) {
                pipe.write_all(payload).await?;
                pipe.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let run = async { tokio::join!(feed, child.wait_with_output()) };

        let (fed, output) = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| EngineError::TimedOut(limit))?,
            None => run.await,
        };

        let output = output.map_err(|source| EngineError::Io {
            path: PathBuf::from(&self.command),
            source,
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(EngineError::NonZeroExit {
                status: output.status.to_string(),
                stderr: preview_text(stderr.trim(), STDERR_PREVIEW_CHARS),
            });
        }
        if !stderr.trim().is_empty() {
            tracing::debug!(stderr = %stderr.trim(), "Engine stderr");
        }

        // An engine that succeeds without draining stdin is not an error
        match fed {
            Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                return Err(EngineError::Io {
                    path: PathBuf::from("<stdin>"),
                    source: e,
                });
            }
            _ => {}
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl DamageEnginePort for EngineProcessClient {
    async fn calculate(
        &self,
        partition: PartitionIndex,
        items: &[WorkItem],
    ) -> Result<Vec<RollResult>, EngineError> {
        let requests: Vec<CalcRequestDto> = items.iter().map(CalcRequestDto::from).collect();
        let payload = serde_json::to_string(&requests)
            .map_err(|e| EngineError::Serialization(e.to_string()))?;

        tracing::debug!(
            partition = %partition,
            items = items.len(),
            transport = ?self.transport,
            "Invoking damage engine"
        );

        let response = match self.transport {
            TransportKind::File => self.call_with_files(partition, &payload).await?,
            TransportKind::Stdio => self.execute(None, Some(payload.as_bytes())).await?,
            TransportKind::Argument => self.execute(Some(payload), None).await?,
        };

        parse_response(&response, items.len())
    }

    async fn cleanup(&self, partitions: &[PartitionIndex]) -> Result<(), EngineError> {
        if self.transport != TransportKind::File {
            return Ok(());
        }
        for partition in partitions {
            remove_if_present(&self.request_path(*partition)).await?;
            remove_if_present(&self.response_path(*partition)).await?;
        }
        Ok(())
    }
}

fn parse_response(bytes: &[u8], requested: usize) -> Result<Vec<RollResult>, EngineError> {
    let preview = || preview_text(String::from_utf8_lossy(bytes).trim(), RESPONSE_PREVIEW_CHARS);

    let response = CalcResponseDto::parse(bytes)
        .map_err(|e| EngineError::MalformedResponse(format!("{e}. body={}", preview())))?;

    response.into_rolls(requested).ok_or_else(|| {
        EngineError::MalformedResponse(format!(
            "expected one roll list per request ({requested}). body={}",
            preview()
        ))
    })
}

async fn remove_if_present(path: &Path) -> Result<(), EngineError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(EngineError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn preview_text(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::domain::entities::Pokemon;

    fn items(count: usize) -> Vec<WorkItem> {
        (0..count)
            .map(|_| {
                WorkItem::new(
                    Pokemon::new("Miraidon").with_move("Electro Drift"),
                    Pokemon::new("Rillaboom"),
                )
            })
            .collect()
    }

    fn shell(script: &str, work_dir: &Path, transport: TransportKind) -> EngineProcessClient {
        EngineProcessClient::new("sh", work_dir)
            .with_args(vec!["-c".to_string(), script.to_string()])
            .with_transport(transport)
    }

    #[tokio::test]
    async fn test_stdio_transport() {
        let dir = tempfile::tempdir().unwrap();
        let engine = shell(
            "grep -q attacking_pokemon && echo '[[10,11,12]]'",
            dir.path(),
            TransportKind::Stdio,
        );

        let rolls = engine.calculate(PartitionIndex::new(0), &items(1)).await.unwrap();
        assert_eq!(rolls, vec![RollResult::new(vec![10, 11, 12])]);
    }

    #[tokio::test]
    async fn test_argument_transport() {
        let dir = tempfile::tempdir().unwrap();
        // `sh -c script arg` exposes the trailing argument as $0
        let engine = shell(
            "printf '%s' \"$0\" | grep -q Rillaboom && echo '[[7],[8]]'",
            dir.path(),
            TransportKind::Argument,
        );

        let rolls = engine.calculate(PartitionIndex::new(0), &items(2)).await.unwrap();
        assert_eq!(rolls, vec![RollResult::new(vec![7]), RollResult::new(vec![8])]);
    }

    #[tokio::test]
    async fn test_file_transport_and_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let engine = shell(
            "grep -q Miraidon \"data-$0.json\" && echo '[[1,2],[3,4]]' > \"output-$0.json\"",
            dir.path(),
            TransportKind::File,
        );
        let partition = PartitionIndex::new(3);

        let rolls = engine.calculate(partition, &items(2)).await.unwrap();
        assert_eq!(rolls, vec![RollResult::new(vec![1, 2]), RollResult::new(vec![3, 4])]);
        assert!(dir.path().join("data-3.json").exists());
        assert!(dir.path().join("output-3.json").exists());

        engine.cleanup(&[partition, PartitionIndex::new(4)]).await.unwrap();
        assert!(!dir.path().join("data-3.json").exists());
        assert!(!dir.path().join("output-3.json").exists());
    }

    #[tokio::test]
    async fn test_file_transport_ignores_stale_output() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("output-0.json"), "[[99]]").unwrap();
        let engine = shell("true", dir.path(), TransportKind::File);

        let err = engine.calculate(PartitionIndex::new(0), &items(1)).await.unwrap_err();
        assert!(matches!(err, EngineError::Io { .. }));
    }

    #[tokio::test]
    async fn test_non_zero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let engine = shell("echo 'unknown species' >&2; exit 3", dir.path(), TransportKind::Argument);

        let err = engine.calculate(PartitionIndex::new(0), &items(1)).await.unwrap_err();
        match err {
            EngineError::NonZeroExit { stderr, .. } => assert_eq!(stderr, "unknown species"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let dir = tempfile::tempdir().unwrap();
        let engine = shell("echo 'not json'", dir.path(), TransportKind::Argument);
        let err = engine.calculate(PartitionIndex::new(0), &items(1)).await.unwrap_err();
        assert!(matches!(err, EngineError::MalformedResponse(_)));

        let engine = shell("echo '[1, 2]'", dir.path(), TransportKind::Argument);
        let err = engine.calculate(PartitionIndex::new(0), &items(2)).await.unwrap_err();
        assert!(matches!(err, EngineError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_bare_roll_list_for_single_item() {
        let dir = tempfile::tempdir().unwrap();
        let engine = shell("echo '[85, 90, 100]'", dir.path(), TransportKind::Argument);
        let rolls = engine.calculate(PartitionIndex::new(0), &items(1)).await.unwrap();
        assert_eq!(rolls, vec![RollResult::new(vec![85, 90, 100])]);
    }

    #[tokio::test]
    async fn test_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let engine = shell("sleep 5", dir.path(), TransportKind::Argument)
            .with_timeout(Duration::from_millis(100));

        let err = engine.calculate(PartitionIndex::new(0), &items(1)).await.unwrap_err();
        assert!(matches!(err, EngineError::TimedOut(_)));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let engine = EngineProcessClient::new("/nonexistent/damage-engine", dir.path())
            .with_transport(TransportKind::Stdio);

        let err = engine.calculate(PartitionIndex::new(0), &items(1)).await.unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }

    #[test]
    fn test_preview_text() {
        assert_eq!(preview_text("short", 10), "short");
        assert_eq!(preview_text("abcdef", 3), "abc...");
    }
}
