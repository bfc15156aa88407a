//! CLI command implementations
//!
//! - `report` - Full report run (load, aggregate, chart, narrate, write)

pub mod report;

// Re-export command functions for main.rs
pub use report::*;
