//! AI completion client
//!
//! Thin client for an OpenAI-compatible chat-completion endpoint, used by
//! the database query tool to turn an operator question into SQL. Requests
//! carry a bounded timeout; failures surface verbatim as
//! [`WorkflowError::ExternalService`] and are never retried — the operator
//! re-triggers manually.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tubeops_core::{CompletionConfig, WorkflowError};

/// Produces one completion for one prompt
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete `prompt`, returning the raw model text
    ///
    /// # Errors
    /// - [`WorkflowError::ExternalService`] on transport or model failure
    async fn complete(&self, prompt: &str) -> Result<String, WorkflowError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    stop: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible endpoint
pub struct OpenAiClient {
    http: reqwest::Client,
    config: CompletionConfig,
}

impl OpenAiClient {
    /// Client from startup configuration
    ///
    /// # Errors
    /// - [`WorkflowError::Config`] when the HTTP client cannot be built
    pub fn new(config: CompletionConfig) -> Result<Self, WorkflowError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WorkflowError::Config(format!("completion client: {e}")))?;
        Ok(Self { http, config })
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
            max_tokens: 150,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop: vec!["#", ";"],
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, WorkflowError> {
        let url = format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        );
        tracing::debug!(%url, "requesting completion");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| WorkflowError::external("completion", e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WorkflowError::external(
                "completion",
                format!("{status}: {body}"),
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| WorkflowError::external("completion", e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| WorkflowError::external("completion", "empty completion"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client() -> OpenAiClient {
        OpenAiClient::new(CompletionConfig {
            api_key: "sk-test".into(),
            endpoint: "https://api.openai.com/v1".into(),
            model: "gpt-3.5-turbo".into(),
            timeout: Duration::from_secs(30),
        })
        .unwrap()
    }

    #[test]
    fn request_body_pins_generation_settings() {
        let client = client();
        let body = serde_json::to_value(client.request_body("SELECT")).unwrap();
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["max_tokens"], 150);
        assert_eq!(body["stop"], serde_json::json!(["#", ";"]));
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn response_parsing_takes_first_choice() {
        let raw = r#"{"choices":[{"message":{"content":" id, title FROM videos "}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        let content = parsed.choices[0].message.content.as_deref().unwrap();
        assert_eq!(content.trim(), "id, title FROM videos");
    }
}
