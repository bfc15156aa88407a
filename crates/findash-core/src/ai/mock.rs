//! Mock backend for testing
//!
//! Returns a fixed reply, or a forced failure, without touching the network.

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::InsightBackend;

const DEFAULT_RESPONSE: &str = "Profitability is positive overall. \
Watch departments whose expenses approach their revenue, and review \
low-profit periods for cost reductions.";

/// Mock insight backend for testing
///
/// `response: None` makes every call fail, which exercises the fallback path.
#[derive(Clone, Debug)]
pub struct MockBackend {
    pub response: Option<String>,
}

impl MockBackend {
    /// Create a mock backend with the default canned reply
    pub fn new() -> Self {
        Self::with_response(DEFAULT_RESPONSE)
    }

    /// Create a mock backend that replies with `response`
    pub fn with_response(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
        }
    }

    /// Create a mock backend whose calls always fail
    pub fn failing() -> Self {
        Self { response: None }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InsightBackend for MockBackend {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
        self.response
            .clone()
            .ok_or_else(|| Error::InsightService("mock backend configured to fail".into()))
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
