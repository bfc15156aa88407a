//! findash Core Library
//!
//! Building blocks for the findash financial report generator:
//! - CSV import of department-level financial records
//! - KPI aggregation and High/Low profit classification
//! - Chart rendering (bar, pie, trend line) to PNG
//! - Pluggable AI insight backends (OpenAI-compatible, mock)
//! - Report assembly into a multi-sheet XLSX workbook

pub mod ai;
pub mod aggregate;
pub mod charts;
pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod report;

/// Test utilities including a mock chat-completions server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::FinancialSummary;
pub use ai::{
    InsightBackend, InsightClient, MockBackend, OpenAICompatibleBackend, FALLBACK_INSIGHTS,
};
pub use charts::ChartPaths;
pub use config::{InsightConfig, ReportConfig};
pub use error::{Error, Result};
pub use models::{CategoryTotal, Performance, Record, Totals};
pub use report::{generate_report, ReportArtifacts, ReportStatus};
