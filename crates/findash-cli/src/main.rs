//! findash CLI - Financial dashboard report generator
//!
//! Usage:
//!   findash                                   Read finance_data.csv, write to outputs/
//!   findash --input data.csv --output report  Custom input file and output folder
//!
//! Insight backend settings come from the environment
//! (OPENAI_COMPATIBLE_HOST, OPENAI_COMPATIBLE_MODEL, OPENAI_API_KEY, ...).

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use findash_core::{InsightClient, InsightConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let client = InsightClient::from_config(&InsightConfig::from_env());
    commands::cmd_report(&cli.report_config(), &client).await
}
