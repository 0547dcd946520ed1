//! Application configuration
//!
//! Layers, lowest to highest precedence: built-in defaults, an optional TOML
//! file (`rollbatch.toml` unless `--config` names another), `ROLLBATCH_*`
//! environment variables (`__` separates nested keys), then CLI flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "rollbatch.toml";

const ENV_PREFIX: &str = "ROLLBATCH";

/// How requests and responses travel between us and the engine process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// `data-<i>.json` in, `output-<i>.json` out, partition index as last argument
    File,
    /// Payload on stdin, response on stdout
    Stdio,
    /// Payload as last argument, response on stdout
    Argument,
}

/// External damage engine settings
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Program to run
    pub command: String,
    /// Arguments placed before any transport-specific argument
    pub args: Vec<String>,
    pub transport: TransportKind,
    /// Kill the engine after this many seconds
    pub timeout_secs: Option<u64>,
}

impl EngineConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Batch run configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Delimited input table; the first line is a header
    pub input_path: PathBuf,
    /// Where the rolls are written, one line per input row
    pub output_path: PathBuf,
    /// Working directory for the engine and its handoff files
    pub work_dir: PathBuf,
    /// Number of partitions run in parallel
    pub concurrency: usize,
    /// Keep per-partition handoff files after the run
    pub keep_artifacts: bool,
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Load configuration from defaults, config file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let file = match config_file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let config: Self = config::Config::builder()
            .set_default("input_path", "data.csv")?
            .set_default("output_path", "rolls.csv")?
            .set_default("work_dir", ".")?
            .set_default("concurrency", 8)?
            .set_default("keep_artifacts", false)?
            .set_default("engine.command", "bun")?
            .set_default("engine.args", vec!["run", "index.ts"])?
            .set_default("engine.transport", "file")?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that the type system cannot
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }
        if self.engine.command.trim().is_empty() {
            anyhow::bail!("engine.command must not be empty");
        }
        Ok(())
    }
}
