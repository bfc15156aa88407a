//! Pluggable AI insight backend abstraction
//!
//! The report pipeline asks one question of a language model: "here are the
//! KPIs, what do they say?". This module hides which server answers it.
//!
//! # Architecture
//!
//! - `InsightBackend` trait: one chat completion per call
//! - `InsightClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let client = InsightClient::from_config(&InsightConfig::from_env());
//! let text = client.generate_insights(&summary).await;
//! ```
//!
//! `generate_insights` never fails. Any backend error is logged and replaced
//! with [`FALLBACK_INSIGHTS`].

mod mock;
mod openai_compatible;

pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{InsightBackendKind, InsightConfig};
use crate::error::{Error, Result};

/// Returned in place of commentary whenever the backend call fails
pub const FALLBACK_INSIGHTS: &str = "⚠️ AI could not generate insights.";

/// System role sent with every request
pub const SYSTEM_PROMPT: &str = "You provide expert financial analysis.";

/// Fixed instruction placed before the KPI summary in the user message
pub const INSTRUCTION_PREFIX: &str = "You are a financial expert. Based on the following \
summary, provide insights on profitability, risks, and areas for improvement:\n\n";

/// Longest summary forwarded to the model, in chars
pub const MAX_SUMMARY_CHARS: usize = 4000;

/// Build the user message for a KPI summary
pub fn build_prompt(summary: &str) -> String {
    let bounded = match summary.char_indices().nth(MAX_SUMMARY_CHARS) {
        Some((cut, _)) => &summary[..cut],
        None => summary,
    };
    format!("{}{}", INSTRUCTION_PREFIX, bounded)
}

/// Trait defining the interface for all insight backends
#[async_trait]
pub trait InsightBackend: Send + Sync {
    /// Send one system + user message pair and return the reply text
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete insight client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum InsightClient {
    /// OpenAI chat completions API or any server that speaks it
    OpenAICompatible(OpenAICompatibleBackend),
    /// Deterministic backend for tests and offline runs
    Mock(MockBackend),
}

impl InsightClient {
    /// Create the backend selected by the configuration
    pub fn from_config(config: &InsightConfig) -> Self {
        match config.backend {
            InsightBackendKind::OpenAICompatible => {
                InsightClient::OpenAICompatible(OpenAICompatibleBackend::from_config(config))
            }
            InsightBackendKind::Mock => InsightClient::Mock(MockBackend::new()),
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        InsightClient::Mock(MockBackend::new())
    }

    /// Generate commentary for a KPI summary, or the fallback text on any failure
    pub async fn generate_insights(&self, summary: &str) -> String {
        info!(model = %self.model(), host = %self.host(), "Requesting AI insights");

        let result = self
            .complete(SYSTEM_PROMPT, &build_prompt(summary))
            .await
            .and_then(|text| {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Err(Error::InsightService("empty response".into()))
                } else {
                    Ok(trimmed.to_string())
                }
            });

        match result {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "❌ AI Error, using fallback insights");
                FALLBACK_INSIGHTS.to_string()
            }
        }
    }
}

// Implement InsightBackend for InsightClient by delegating to the inner backend
#[async_trait]
impl InsightBackend for InsightClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        match self {
            InsightClient::OpenAICompatible(b) => b.complete(system, prompt).await,
            InsightClient::Mock(b) => b.complete(system, prompt).await,
        }
    }

    fn model(&self) -> &str {
        match self {
            InsightClient::OpenAICompatible(b) => b.model(),
            InsightClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            InsightClient::OpenAICompatible(b) => b.host(),
            InsightClient::Mock(b) => b.host(),
        }
    }
}
