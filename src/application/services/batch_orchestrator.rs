//! Batch Orchestrator - Parallel dispatch of partitions to the damage engine
//!
//! A run splits its records into `concurrency` partitions and spawns one unit
//! per partition. Each unit parses its records, calls the engine once, and
//! reports `(index, rolls)`. Results are gathered into a [`BatchResult`] and
//! flattened by partition index, so completion order never affects output.
//!
//! Failure is all-or-nothing: every unit is awaited, and if any of them failed
//! the run reports the failure from the lowest partition index and nothing is
//! written to the sink.
//!
//! # Architecture
//!
//! The orchestrator depends only on ports:
//! - `DamageEnginePort` for calculations
//! - `RollSinkPort` for the final output

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;

use crate::application::ports::outbound::{DamageEnginePort, EngineError, RollSinkPort, SinkError};
use crate::application::services::partitioner::partition;
use crate::application::services::record_normalizer::{parse_row, RecordParseError};
use crate::domain::aggregates::{AggregateError, BatchResult};
use crate::domain::entities::WorkItem;
use crate::domain::value_objects::{Partition, PartitionIndex, RollResult, RunId};

/// Errors that fail a batch run
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Partition {partition}, data row {row}: invalid record")]
    Record {
        partition: PartitionIndex,
        row: usize,
        #[source]
        source: RecordParseError,
    },

    #[error("Partition {partition}: engine invocation failed")]
    Engine {
        partition: PartitionIndex,
        #[source]
        source: EngineError,
    },

    #[error("Partition {partition}: worker stopped unexpectedly: {message}")]
    Worker {
        partition: PartitionIndex,
        message: String,
    },

    #[error("Failed to collect results")]
    Collect(#[from] AggregateError),

    #[error("Failed to write results")]
    Sink(#[from] SinkError),
}

impl BatchError {
    /// The partition the failure came from, if it came from one
    pub fn partition(&self) -> Option<PartitionIndex> {
        match self {
            Self::Record { partition, .. }
            | Self::Engine { partition, .. }
            | Self::Worker { partition, .. } => Some(*partition),
            Self::Collect(_) | Self::Sink(_) => None,
        }
    }
}

/// Lifecycle of one partition unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl std::fmt::Display for PartitionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Knobs for a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Number of partitions, and so of concurrent engine processes
    pub concurrency: usize,
    /// Leave per-partition engine artifacts in place after the run
    pub keep_artifacts: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            keep_artifacts: false,
        }
    }
}

/// Summary of a successful run
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub run_id: RunId,
    pub partitions: usize,
    pub rolls: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Turns one input record into a work item inside a partition unit
type Normalizer<T> = fn(T) -> Result<WorkItem, RecordParseError>;

type UnitOutcome = Result<(PartitionIndex, Vec<RollResult>), BatchError>;

/// Service that fans a batch out over the damage engine and gathers ordered results
pub struct BatchOrchestrator<E: DamageEnginePort, S: RollSinkPort> {
    engine: Arc<E>,
    sink: S,
    options: BatchOptions,
}

impl<E, S> BatchOrchestrator<E, S>
where
    E: DamageEnginePort + 'static,
    S: RollSinkPort,
{
    pub fn new(engine: Arc<E>, sink: S, options: BatchOptions) -> Self {
        Self {
            engine,
            sink,
            options,
        }
    }

    /// Run a batch of delimited rows; each row is parsed inside its partition unit
    pub async fn run_lines(&self, lines: Vec<String>) -> Result<BatchReport, BatchError> {
        self.run(lines, |line: String| parse_row(&line)).await
    }

    /// Run a batch of already-built work items
    pub async fn run_items(&self, items: Vec<WorkItem>) -> Result<BatchReport, BatchError> {
        self.run(items, Ok).await
    }

    async fn run<T>(&self, records: Vec<T>, normalize: Normalizer<T>) -> Result<BatchReport, BatchError>
    where
        T: Send + 'static,
    {
        let run_id = RunId::new();
        let started_at = Utc::now();
        let partitions = partition(records, self.options.concurrency);
        let count = partitions.len();

        tracing::info!(run = %run_id, partitions = count, "Starting batch run");
        for p in &partitions {
            tracing::info!(
                run = %run_id,
                partition = %p.index,
                size = p.len(),
                state = %PartitionState::Pending,
                "Partition prepared"
            );
        }

        let (indices, handles): (Vec<PartitionIndex>, Vec<_>) = partitions
            .into_iter()
            .map(|p| {
                let engine = self.engine.clone();
                (p.index, tokio::spawn(run_partition(engine, p, normalize)))
            })
            .unzip();

        let mut result = BatchResult::new(count);
        let mut failures = Vec::new();
        for (index, joined) in indices.iter().copied().zip(join_all(handles).await) {
            let outcome = joined.unwrap_or_else(|e| {
                Err(BatchError::Worker {
                    partition: index,
                    message: e.to_string(),
                })
            });
            match outcome {
                Ok((index, rolls)) => {
                    tracing::info!(
                        run = %run_id,
                        partition = %index,
                        rolls = rolls.len(),
                        state = %PartitionState::Succeeded,
                        "Partition finished"
                    );
                    if let Err(e) = result.insert(index, rolls) {
                        failures.push(BatchError::from(e));
                    }
                }
                Err(e) => {
                    tracing::error!(
                        run = %run_id,
                        partition = %index,
                        state = %PartitionState::Failed,
                        error = &e as &(dyn std::error::Error + 'static),
                        "Partition failed"
                    );
                    failures.push(e);
                }
            }
        }

        let outcome = match failures.into_iter().next() {
            Some(first) => Err(first),
            None => self.write_results(result).await,
        };

        if !self.options.keep_artifacts {
            if let Err(e) = self.engine.cleanup(&indices).await {
                tracing::warn!(
                    run = %run_id,
                    error = &e as &(dyn std::error::Error + 'static),
                    "Failed to remove engine artifacts"
                );
            }
        }

        let rolls = outcome?;
        let report = BatchReport {
            run_id,
            partitions: count,
            rolls,
            started_at,
            finished_at: Utc::now(),
        };
        tracing::info!(
            run = %run_id,
            partitions = report.partitions,
            rolls = report.rolls,
            elapsed_ms = report.elapsed().num_milliseconds(),
            "Batch run complete"
        );
        Ok(report)
    }

    async fn write_results(&self, result: BatchResult) -> Result<usize, BatchError> {
        let rolls = result.into_ordered()?;
        self.sink.write_rolls(&rolls).await?;
        Ok(rolls.len())
    }
}

/// One partition unit: parse, calculate, report
async fn run_partition<T, E>(
    engine: Arc<E>,
    partition: Partition<T>,
    normalize: Normalizer<T>,
) -> UnitOutcome
where
    E: DamageEnginePort + ?Sized,
{
    if partition.is_empty() {
        tracing::debug!(partition = %partition.index, "Empty partition, engine not started");
        return Ok((partition.index, Vec::new()));
    }

    let Partition {
        index,
        offset,
        records,
    } = partition;
    tracing::debug!(partition = %index, state = %PartitionState::Running, "Partition running");

    let items = records
        .into_iter()
        .enumerate()
        .map(|(position, record)| {
            normalize(record).map_err(|source| BatchError::Record {
                partition: index,
                row: offset + position + 1,
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let rolls = engine
        .calculate(index, &items)
        .await
        .map_err(|source| BatchError::Engine {
            partition: index,
            source,
        })?;

    if rolls.len() != items.len() {
        return Err(BatchError::Engine {
            partition: index,
            source: EngineError::LengthMismatch {
                expected: items.len(),
                actual: rolls.len(),
            },
        });
    }

    Ok((index, rolls))
}
