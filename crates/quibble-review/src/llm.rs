use std::time::Duration;

use async_trait::async_trait;
use quibble_core::{LlmConfig, QuibbleError};
use serde::Serialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// A message in a chat conversation with the model.
///
/// # Examples
///
/// ```
/// use quibble_review::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage::user("Review this code");
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

impl ChatMessage {
    /// A message from the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Role in the chat conversation. Reviews send a single user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input.
    User,
}

/// Body of a chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation sent to the model.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// A service that turns a chat request into generated text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send `request` and return the text of the first choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, QuibbleError>;
}

/// OpenAI-compatible chat completions client.
///
/// Works with any provider that exposes the `/v1/chat/completions` endpoint:
/// OpenAI, Ollama, vLLM, LiteLLM, etc.
///
/// # Examples
///
/// ```
/// use quibble_core::LlmConfig;
/// use quibble_review::llm::LlmClient;
///
/// let config = LlmConfig {
///     api_key: Some("test-key".into()),
///     ..LlmConfig::default()
/// };
/// let client = LlmClient::new(&config).unwrap();
/// ```
pub struct LlmClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl LlmClient {
    /// Create a new completion client from configuration.
    ///
    /// Requests time out after 120 seconds; a timed-out file is reported
    /// like any other completion failure.
    ///
    /// # Errors
    ///
    /// Returns [`QuibbleError::Completion`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, QuibbleError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| QuibbleError::Completion(format!("failed to create HTTP client: {e}")))?;
        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url,
        })
    }

    /// Full URL of the chat completions endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, QuibbleError> {
        let url = self.endpoint();
        debug!(model = %request.model, %url, "sending completion request");

        let mut builder = self.client.post(&url).json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| QuibbleError::Completion(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(QuibbleError::Completion(format!(
                "API error {status}: {}",
                provider_error_message(&body_text)
            )));
        }

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| QuibbleError::Completion(format!("failed to parse response: {e}")))?;

        extract_content(&response_body)
    }
}

/// Pull `choices[0].message.content` out of a completion response.
fn extract_content(body: &serde_json::Value) -> Result<String, QuibbleError> {
    body.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| QuibbleError::Completion(format!("unexpected response structure: {body}")))
}

/// The `error.message` of an OpenAI-style error body, or the raw body.
fn provider_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_construction_succeeds() {
        let client = LlmClient::new(&LlmConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn endpoint_uses_custom_base_url() {
        let config = LlmConfig {
            base_url: Some("http://localhost:11434/".into()),
            ..LlmConfig::default()
        };
        let client = LlmClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn endpoint_defaults_to_openai() {
        let client = LlmClient::new(&LlmConfig::default()).unwrap();
        assert_eq!(client.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn request_serializes_all_fields() {
        let request = CompletionRequest {
            model: "gpt-3.5-turbo".into(),
            messages: vec![ChatMessage::user("hello")],
            temperature: 0.0,
            max_tokens: 4096,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["max_tokens"], 4096);
    }

    #[test]
    fn extract_content_reads_first_choice() {
        let body = serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "nice code" } },
                { "message": { "role": "assistant", "content": "ignored" } }
            ]
        });
        assert_eq!(extract_content(&body).unwrap(), "nice code");
    }

    #[test]
    fn extract_content_rejects_malformed_body() {
        let body = serde_json::json!({ "choices": [] });
        let err = extract_content(&body).unwrap_err();
        assert!(err.to_string().contains("unexpected response structure"));
    }

    #[test]
    fn provider_error_message_prefers_error_field() {
        let body = r#"{"error":{"message":"slow down","type":"rate_limit_error"}}"#;
        assert_eq!(provider_error_message(body), "slow down");
        assert_eq!(provider_error_message(" plain text "), "plain text");
    }

    fn client_for(server: &mockito::Server) -> LlmClient {
        let config = LlmConfig {
            api_key: Some("sk-test".into()),
            base_url: Some(server.url()),
            ..LlmConfig::default()
        };
        LlmClient::new(&config).unwrap()
    }

    fn review_request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-3.5-turbo".into(),
            messages: vec![ChatMessage::user("review a.py")],
            temperature: 0.0,
            max_tokens: 4096,
        }
    }

    #[tokio::test]
    async fn complete_posts_request_and_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "max_tokens": 4096,
                "messages": [{ "role": "user", "content": "review a.py" }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"What a mess."}}]}"#)
            .create_async()
            .await;

        let text = client_for(&server).complete(&review_request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(text, "What a mess.");
    }

    #[tokio::test]
    async fn rate_limit_surfaces_provider_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body(r#"{"error":{"message":"slow down","type":"rate_limit_error"}}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .complete(&review_request())
            .await
            .unwrap_err();

        assert!(matches!(err, QuibbleError::Completion(_)));
        let message = err.to_string();
        assert!(message.contains("429"), "{message}");
        assert!(message.contains("slow down"), "{message}");
    }

    #[tokio::test]
    async fn malformed_success_body_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .complete(&review_request())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("unexpected response structure"));
    }
}
