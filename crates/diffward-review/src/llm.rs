use std::time::Duration;

use async_trait::async_trait;
use diffward_core::{ModelName, ReviewError};
use serde::{Deserialize, Serialize};

/// Endpoint base used when no `api_base_url` is configured.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com";

/// Sampling temperature for review completions.
pub const REVIEW_TEMPERATURE: f32 = 0.2;

/// A message in a chat conversation with the model.
///
/// # Examples
///
/// ```
/// use diffward_review::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage {
///     role: Role::User,
///     content: "Review this code".into(),
/// };
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

/// Role in the chat conversation.
///
/// # Examples
///
/// ```
/// use diffward_review::llm::Role;
///
/// let role = Role::System;
/// assert_eq!(serde_json::to_string(&role).unwrap(), "\"system\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions.
    System,
    /// User input.
    User,
}

/// A chat-completion backend.
///
/// Implementations return the first choice's message text, or an empty
/// string when the response carries none.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier sent with each request.
    fn model(&self) -> &str;

    /// Run one completion over `messages`.
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, ReviewError>;
}

/// OpenAI-compatible chat completions client.
///
/// Works with any provider that exposes the `/v1/chat/completions` endpoint.
///
/// # Examples
///
/// ```
/// use diffward_core::ModelName;
/// use diffward_review::llm::LlmClient;
///
/// let client = LlmClient::new(ModelName::Gpt4oMini, "test-key", None).unwrap();
/// assert_eq!(client.base_url(), "https://api.openai.com");
/// ```
pub struct LlmClient {
    client: reqwest::Client,
    model: ModelName,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    /// Create a client for `model`, authenticating with `api_key`.
    ///
    /// `base_url` defaults to [`DEFAULT_API_BASE`]; a trailing slash is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Llm`] if the HTTP client cannot be built.
    pub fn new(
        model: ModelName,
        api_key: impl Into<String>,
        base_url: Option<&str>,
    ) -> Result<Self, ReviewError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ReviewError::Llm(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            model,
            api_key: api_key.into(),
            base_url: base_url
                .unwrap_or(DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    /// Endpoint base this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl CompletionResponse {
    fn into_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    fn model(&self) -> &str {
        self.model.as_str()
    }

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, ReviewError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = CompletionRequest {
            model: self.model.as_str(),
            messages: &messages,
            temperature: REVIEW_TEMPERATURE,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ReviewError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ReviewError::Llm(format!(
                "LLM API error {status}: {body_text}"
            )));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ReviewError::Llm(format!("failed to parse response: {e}")))?;

        Ok(parsed.into_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_defaults_and_trims() {
        let client = LlmClient::new(ModelName::Gpt41, "k", None).unwrap();
        assert_eq!(client.base_url(), DEFAULT_API_BASE);

        let client = LlmClient::new(ModelName::Gpt41, "k", Some("http://localhost:8080/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn model_reports_identifier() {
        let client = LlmClient::new(ModelName::Gpt4oMini, "k", None).unwrap();
        assert_eq!(client.model(), "gpt-4o-mini");
    }

    #[test]
    fn request_body_shape() {
        let messages = vec![
            ChatMessage {
                role: Role::System,
                content: "sys".into(),
            },
            ChatMessage {
                role: Role::User,
                content: "usr".into(),
            },
        ];
        let body = CompletionRequest {
            model: "gpt-4.1-mini",
            messages: &messages,
            temperature: REVIEW_TEMPERATURE,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4.1-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "usr");
        assert!((json["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn response_text_extraction() {
        let parse = |raw: &str| {
            serde_json::from_str::<CompletionResponse>(raw)
                .unwrap()
                .into_text()
        };
        assert_eq!(
            parse(r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#),
            "hi"
        );
        assert_eq!(parse(r#"{"choices":[{"message":{"content":null}}]}"#), "");
        assert_eq!(parse(r#"{"choices":[]}"#), "");
        assert_eq!(parse(r#"{}"#), "");
    }
}
