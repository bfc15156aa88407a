//! CLI argument definitions using clap
//!
//! The actual command implementation is in the `commands` module.

use std::path::PathBuf;

use clap::Parser;
use findash_core::config::{ReportConfig, DEFAULT_INPUT, DEFAULT_OUTPUT_DIR};

/// findash - Turn a financial CSV into charts, a workbook and AI commentary
#[derive(Parser, Debug)]
#[command(name = "findash")]
#[command(about = "Financial dashboard and report generator", long_about = None)]
#[command(version)]
pub struct Cli {
    /// CSV file with Date, Department, Revenue, Expenses and Profit columns
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Folder that receives the charts, workbook and insights text
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    pub fn report_config(&self) -> ReportConfig {
        ReportConfig::new(self.input.clone(), self.output.clone())
    }
}
