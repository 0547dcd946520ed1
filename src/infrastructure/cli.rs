//! Command line interface

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::application::services::{parse_paste, BatchOptions, BatchOrchestrator};
use crate::domain::entities::WorkItem;
use crate::infrastructure::config::{AppConfig, TransportKind};
use crate::infrastructure::engine_process::EngineProcessClient;
use crate::infrastructure::input_reader::{read_data_rows, read_to_string};
use crate::infrastructure::roll_writer::{CsvRollWriter, StdoutRollWriter};

#[derive(Debug, Parser)]
#[command(
    name = "rollbatch",
    version,
    about = "Batch damage-roll calculations through an external engine"
)]
pub struct Cli {
    /// Config file (defaults to ./rollbatch.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Calculate every row of the input table and write the rolls file
    Run(RunArgs),
    /// Calculate a single attacker/defender matchup from two paste files
    Matchup(MatchupArgs),
}

/// Options shared by every command that starts the engine
#[derive(Debug, Args, Clone)]
struct EngineArgs {
    /// Directory the engine runs in and where handoff files are written
    #[arg(long)]
    work_dir: Option<PathBuf>,
    #[arg(long, value_enum)]
    transport: Option<TransportKind>,
    /// Keep per-partition handoff files after the run
    #[arg(long)]
    keep: bool,
}

impl EngineArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(work_dir) = &self.work_dir {
            config.work_dir = work_dir.clone();
        }
        if let Some(transport) = self.transport {
            config.engine.transport = transport;
        }
        if self.keep {
            config.keep_artifacts = true;
        }
    }
}

#[derive(Debug, Args, Clone)]
struct RunArgs {
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    output: Option<PathBuf>,
    /// Number of partitions processed in parallel
    #[arg(long)]
    concurrency: Option<usize>,
    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Debug, Args, Clone)]
struct MatchupArgs {
    /// Paste file for the attacking Pokemon
    attacker: PathBuf,
    /// Paste file for the defending Pokemon
    defender: PathBuf,
    /// Force a terrain for this calculation
    #[arg(long)]
    terrain: Option<String>,
    /// Terastallize the attacker (needs a Tera Type line)
    #[arg(long)]
    tera: bool,
    /// Use this move instead of the attacker's first
    #[arg(long = "move")]
    move_name: Option<String>,
    #[command(flatten)]
    engine: EngineArgs,
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub async fn run(self) -> Result<()> {
        let config = AppConfig::load(self.config.as_deref())?;
        match self.command {
            Command::Run(args) => run_batch(config, args).await,
            Command::Matchup(args) => run_matchup(config, args).await,
        }
    }
}

async fn run_batch(mut config: AppConfig, args: RunArgs) -> Result<()> {
    if let Some(input) = args.input {
        config.input_path = input;
    }
    if let Some(output) = args.output {
        config.output_path = output;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    args.engine.apply(&mut config);
    config.validate()?;

    tracing::info!(
        input = %config.input_path.display(),
        output = %config.output_path.display(),
        engine = %config.engine.command,
        concurrency = config.concurrency,
        "Configuration loaded"
    );

    let rows = read_data_rows(&config.input_path).await?;
    tracing::info!(rows = rows.len(), "Input loaded");

    let engine = Arc::new(EngineProcessClient::from_config(&config.engine, &config.work_dir));
    let orchestrator = BatchOrchestrator::new(
        engine,
        CsvRollWriter::new(&config.output_path),
        BatchOptions {
            concurrency: config.concurrency,
            keep_artifacts: config.keep_artifacts,
        },
    );

    let outcome = orchestrator.run_lines(rows).await;
    if let Err(e) = &outcome {
        if let Some(partition) = e.partition() {
            tracing::error!(partition = %partition, "Batch aborted");
        }
    }
    let report = outcome.context("Batch run failed; no output written")?;
    tracing::info!(
        run = %report.run_id,
        rolls = report.rolls,
        output = %config.output_path.display(),
        "Rolls ready"
    );
    Ok(())
}

async fn run_matchup(mut config: AppConfig, args: MatchupArgs) -> Result<()> {
    args.engine.apply(&mut config);
    config.validate()?;

    let mut attacker = parse_paste(&read_to_string(&args.attacker).await?)
        .with_context(|| format!("Invalid attacker paste {}", args.attacker.display()))?;
    let defender = parse_paste(&read_to_string(&args.defender).await?)
        .with_context(|| format!("Invalid defender paste {}", args.defender.display()))?;

    if let Some(move_name) = args.move_name {
        attacker.use_move(move_name);
    }
    if args.tera {
        attacker.terastallize();
        if !attacker.is_terastallized() {
            tracing::warn!(name = %attacker.name, "--tera given but the attacker has no Tera Type");
        }
    }

    let mut item = WorkItem::new(attacker, defender);
    if let Some(terrain) = args.terrain {
        item = item.with_terrain(terrain);
    }

    let engine = Arc::new(EngineProcessClient::from_config(&config.engine, &config.work_dir));
    let orchestrator = BatchOrchestrator::new(
        engine,
        StdoutRollWriter,
        BatchOptions {
            concurrency: 1,
            keep_artifacts: config.keep_artifacts,
        },
    );
    orchestrator
        .run_items(vec![item])
        .await
        .context("Matchup calculation failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "rollbatch",
            "run",
            "--input",
            "in.csv",
            "--concurrency",
            "4",
            "--keep",
            "--transport",
            "stdio",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose());
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.input, Some(PathBuf::from("in.csv")));
                assert_eq!(args.concurrency, Some(4));
                assert!(args.engine.keep);
                assert_eq!(args.engine.transport, Some(TransportKind::Stdio));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_matchup() {
        let cli = Cli::try_parse_from([
            "rollbatch",
            "matchup",
            "miraidon.txt",
            "rillaboom.txt",
            "--terrain",
            "Electric",
            "--move",
            "Volt Switch",
            "--tera",
        ])
        .unwrap();

        match cli.command {
            Command::Matchup(args) => {
                assert_eq!(args.attacker, PathBuf::from("miraidon.txt"));
                assert_eq!(args.terrain.as_deref(), Some("Electric"));
                assert_eq!(args.move_name.as_deref(), Some("Volt Switch"));
                assert!(args.tera);
                assert!(!args.engine.keep);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_transport() {
        assert!(Cli::try_parse_from(["rollbatch", "run", "--transport", "fax"]).is_err());
    }
}
