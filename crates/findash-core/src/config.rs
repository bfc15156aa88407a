//! Run configuration
//!
//! `ReportConfig` comes from the command line. `InsightConfig` is read from
//! the environment once by the caller and handed to the insight backend, so
//! backends never look at process state themselves.
//!
//! Environment variables:
//! - `INSIGHT_BACKEND`: Backend to use (openai_compatible, mock). Default: openai_compatible
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (default: https://api.openai.com)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY` or `OPENAI_API_KEY`: Bearer credential (optional)
//! - `OPENAI_MAX_TOKENS`: Response length cap (default: 300)

use std::path::PathBuf;

pub const DEFAULT_INPUT: &str = "finance_data.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 300;

/// Input and output locations for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
}

impl ReportConfig {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT, DEFAULT_OUTPUT_DIR)
    }
}

/// Which insight backend to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightBackendKind {
    OpenAICompatible,
    Mock,
}

impl std::str::FromStr for InsightBackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai_compatible" | "openai" => Ok(Self::OpenAICompatible),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown insight backend: {}", s)),
        }
    }
}

/// Settings for the chat-completions endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightConfig {
    pub backend: InsightBackendKind,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            backend: InsightBackendKind::OpenAICompatible,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl InsightConfig {
    /// Build from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (environment, test fixtures)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match non_empty("INSIGHT_BACKEND").map(|b| b.parse::<InsightBackendKind>()) {
            Some(Ok(kind)) => kind,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Falling back to openai_compatible backend");
                defaults.backend
            }
            None => defaults.backend,
        };

        let max_tokens = non_empty("OPENAI_MAX_TOKENS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.max_tokens);

        Self {
            backend,
            base_url: non_empty("OPENAI_COMPATIBLE_HOST").unwrap_or(defaults.base_url),
            model: non_empty("OPENAI_COMPATIBLE_MODEL").unwrap_or(defaults.model),
            api_key: non_empty("OPENAI_COMPATIBLE_API_KEY").or_else(|| non_empty("OPENAI_API_KEY")),
            max_tokens,
        }
    }
}
