//! OpenAI-compatible backend implementation
//!
//! Works with the hosted OpenAI API and with any server that implements the
//! `/v1/chat/completions` endpoint (vLLM, LocalAI, llama-server, ...).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::InsightConfig;
use crate::error::{Error, Result};

use super::InsightBackend;

/// OpenAI-compatible backend
///
/// One request per call; no retries and no timeout beyond the client default.
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
}

impl OpenAICompatibleBackend {
    /// Create a backend from explicit settings
    pub fn from_config(config: &InsightConfig) -> Self {
        Self {
            http_client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            max_tokens: config.max_tokens,
        }
    }

    fn build_request(&self, system: &str, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl InsightBackend for OpenAICompatibleBackend {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let request = self.build_request(system, prompt);

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.bearer_auth(api_key);
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::InsightService(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let chat_response: ChatCompletionResponse = serde_json::from_str(&body)?;
        debug!(choices = chat_response.choices.len(), "Chat completion received");

        chat_response.first_content().ok_or_else(|| {
            Error::InsightService("No message content in chat completion response".into())
        })
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI chat completion response
///
/// Only the fields the report needs; everything else in the body is ignored.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if the server sent one
    fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockChatServer;

    fn config(base_url: &str) -> InsightConfig {
        InsightConfig {
            base_url: base_url.to_string(),
            api_key: Some("sk-test123".to_string()),
            ..InsightConfig::default()
        }
    }

    #[test]
    fn test_backend_from_config() {
        let backend = OpenAICompatibleBackend::from_config(&config("http://localhost:12434/"));
        assert_eq!(backend.model(), "gpt-3.5-turbo");
        assert_eq!(backend.host(), "http://localhost:12434");
        assert_eq!(backend.api_key, Some("sk-test123".to_string()));
        assert_eq!(backend.max_tokens, 300);
    }

    #[test]
    fn test_chat_completion_request_serialization() {
        let backend = OpenAICompatibleBackend::from_config(&config("http://localhost"));
        let request = backend.build_request("You provide expert financial analysis.", "Hello");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(
            json["messages"][0]["content"],
            "You provide expert financial analysis."
        );
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Hello");
        assert_eq!(json["max_tokens"], 300);
    }

    #[test]
    fn test_chat_completion_response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-3.5-turbo",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Revenue is concentrated in Sales."
                },
                "finish_reason": "stop"
            }]
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.first_content().as_deref(),
            Some("Revenue is concentrated in Sales.")
        );
    }

    #[test]
    fn test_response_without_content() {
        for json in [
            r#"{}"#,
            r#"{"choices": []}"#,
            r#"{"choices": [{"message": null}]}"#,
            r#"{"choices": [{"message": {"role": "assistant"}}]}"#,
        ] {
            let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
            assert!(response.first_content().is_none(), "{}", json);
        }
    }

    #[tokio::test]
    async fn test_complete_against_mock_server() {
        let server =
            MockChatServer::start(200, r#"{"choices":[{"message":{"content":" X \n"}}]}"#).await;
        let backend = OpenAICompatibleBackend::from_config(&config(&server.url()));

        let text = backend.complete("system", "prompt").await.unwrap();
        assert_eq!(text, " X \n");

        let seen = server.last_request().expect("request recorded");
        assert_eq!(seen.authorization.as_deref(), Some("Bearer sk-test123"));
        assert_eq!(seen.body["messages"][1]["content"], "prompt");
        assert_eq!(seen.body["max_tokens"], 300);
    }

    #[tokio::test]
    async fn test_complete_error_status() {
        let server = MockChatServer::start(500, r#"{"error":"boom"}"#).await;
        let backend = OpenAICompatibleBackend::from_config(&config(&server.url()));

        let result = backend.complete("system", "prompt").await;
        assert!(matches!(result, Err(Error::InsightService(ref m)) if m.contains("500")));
    }

    #[tokio::test]
    async fn test_complete_malformed_body() {
        let server = MockChatServer::start(200, "not json").await;
        let backend = OpenAICompatibleBackend::from_config(&config(&server.url()));

        assert!(matches!(
            backend.complete("system", "prompt").await,
            Err(Error::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_complete_unreachable() {
        let backend = OpenAICompatibleBackend::from_config(&config("http://127.0.0.1:1"));
        assert!(matches!(
            backend.complete("system", "prompt").await,
            Err(Error::Http(_))
        ));
    }
}
