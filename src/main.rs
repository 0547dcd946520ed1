//! rollbatch - Batch damage-roll calculations through an external engine
//!
//! rollbatch:
//! - Reads a table of attacker/defender matchups
//! - Splits it into partitions and runs one damage engine process per partition
//! - Writes every matchup's rolls back in input order

mod application;
mod domain;
mod infrastructure;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::infrastructure::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so stdout stays free for matchup output
    let default_filter = if cli.verbose() {
        "rollbatch=debug"
    } else {
        "rollbatch=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting rollbatch");

    cli.run().await
}
