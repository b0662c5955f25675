/// Generation backend adapter — one uniform call into a chat-completions service.
///
/// Every stage talks to the backend through `GenerationBackend`, so tests can
/// substitute a scripted implementation. `ChatBackend` is the HTTP adapter
/// for OpenAI-compatible endpoints. Neither retries; see `core::retry`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::core::config::BackendConfig;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no API credential configured")]
    MissingCredential,
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("server error ({status}): {body}")]
    Server { status: u16, body: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl BackendError {
    /// Transient failures a later attempt might get past.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimited(_) | Self::Server { .. }
        )
    }
}

/// Per-call token and temperature budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    /// 0.0..=1.0
    pub temperature: f32,
}

impl GenerationParams {
    /// First-pass story: room to be creative.
    pub const DRAFT: Self = Self {
        max_tokens: 1200,
        temperature: 0.7,
    };
    /// Judge rewrite: favors following the rubric over novelty.
    pub const REFINE: Self = Self {
        max_tokens: 1500,
        temperature: 0.5,
    };
    /// Title: short and playful.
    pub const TITLE: Self = Self {
        max_tokens: 50,
        temperature: 0.8,
    };

    pub fn validate(&self) -> Result<(), BackendError> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(BackendError::InvalidRequest(format!(
                "temperature {} outside 0..=1",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(BackendError::InvalidRequest(
                "max_tokens must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// The external generative-text capability.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str, params: GenerationParams)
        -> Result<String, BackendError>;
}

#[async_trait]
impl<B: GenerationBackend + ?Sized> GenerationBackend for Box<B> {
    async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, BackendError> {
        (**self).generate(prompt, params).await
    }
}

#[async_trait]
impl<B: GenerationBackend + ?Sized> GenerationBackend for std::sync::Arc<B> {
    async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, BackendError> {
        (**self).generate(prompt, params).await
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

/// HTTP adapter for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatBackend {
    client: Client,
    config: BackendConfig,
}

impl ChatBackend {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn credential(&self) -> Result<&str, BackendError> {
        match self.config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(BackendError::MissingCredential),
        }
    }
}

#[async_trait]
impl GenerationBackend for ChatBackend {
    async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, BackendError> {
        params.validate()?;
        let api_key = self.credential()?;

        let body = request_body(&self.config.model, prompt, params);
        log::debug!(
            "POST {} (model: {}, max_tokens: {}, temperature: {})",
            self.config.api_url,
            self.config.model,
            params.max_tokens,
            params.temperature
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    BackendError::Network(format!("request timed out: {}", err))
                } else if err.is_connect() {
                    BackendError::Network(format!("connection failed: {}", err))
                } else {
                    BackendError::Network(err.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Network(format!("failed to read body: {}", e)))?;

        if !status.is_success() {
            return Err(status_error(status, text));
        }
        parse_completion(&text)
    }
}

fn request_body<'a>(
    model: &'a str,
    prompt: &str,
    params: GenerationParams,
) -> ChatCompletionRequest<'a> {
    ChatCompletionRequest {
        model,
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: Some(prompt.to_string()),
        }],
        max_tokens: params.max_tokens,
        temperature: params.temperature,
    }
}

fn status_error(status: StatusCode, body: String) -> BackendError {
    match status.as_u16() {
        401 | 403 => BackendError::Unauthorized(body),
        429 => BackendError::RateLimited(body),
        code @ 500..=599 => BackendError::Server { status: code, body },
        code => BackendError::InvalidRequest(format!("status {}: {}", code, body)),
    }
}

/// Pull the first choice's message text out of a completion body.
fn parse_completion(body: &str) -> Result<String, BackendError> {
    let data: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::MalformedResponse(format!("failed to parse response: {}", e)))?;

    if let Some(usage) = &data.usage {
        log::debug!("completion used {} tokens", usage.total_tokens);
    }

    data.choices
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::MalformedResponse("no choices returned".to_string()))?
        .message
        .content
        .ok_or_else(|| BackendError::MalformedResponse("choice has no content".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_budgets() {
        assert_eq!(GenerationParams::DRAFT.max_tokens, 1200);
        assert_eq!(GenerationParams::REFINE.max_tokens, 1500);
        assert_eq!(GenerationParams::TITLE.max_tokens, 50);
        assert!(GenerationParams::REFINE.temperature < GenerationParams::DRAFT.temperature);
        assert!(GenerationParams::TITLE.temperature > GenerationParams::DRAFT.temperature);
    }

    #[test]
    fn validate_rejects_out_of_range_temperature() {
        let params = GenerationParams {
            max_tokens: 10,
            temperature: 1.5,
        };
        assert!(matches!(
            params.validate(),
            Err(BackendError::InvalidRequest(_))
        ));
        assert!(GenerationParams::TITLE.validate().is_ok());
    }

    #[test]
    fn request_body_has_single_user_message() {
        let body = request_body("gpt-3.5-turbo", "hello", GenerationParams::DRAFT);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["max_tokens"], 1200);
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "hello");
    }

    #[test]
    fn parse_completion_takes_first_choice() {
        let body = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "Once upon a time"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ],
            "usage": {"total_tokens": 42}
        }"#;
        assert_eq!(parse_completion(body).unwrap(), "Once upon a time");
    }

    #[test]
    fn parse_completion_rejects_bad_bodies() {
        for body in [
            "not json",
            r#"{"choices": []}"#,
            r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#,
        ] {
            assert!(
                matches!(parse_completion(body), Err(BackendError::MalformedResponse(_))),
                "body: {}",
                body
            );
        }
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, String::new()),
            BackendError::Unauthorized(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, String::new()),
            BackendError::RateLimited(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, String::new()),
            BackendError::Server { status: 502, .. }
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, String::new()),
            BackendError::InvalidRequest(_)
        ));
    }

    #[test]
    fn retryable_classification() {
        assert!(BackendError::Network("reset".into()).is_retryable());
        assert!(BackendError::RateLimited("slow down".into()).is_retryable());
        assert!(BackendError::Server {
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(!BackendError::MissingCredential.is_retryable());
        assert!(!BackendError::Unauthorized(String::new()).is_retryable());
        assert!(!BackendError::MalformedResponse(String::new()).is_retryable());
    }

    #[tokio::test]
    async fn missing_credential_fails_at_call_time() {
        let backend = ChatBackend::new(BackendConfig {
            api_url: "http://127.0.0.1:9/unreachable".to_string(),
            ..BackendConfig::default()
        })
        .unwrap();
        let err = backend
            .generate("hello", GenerationParams::DRAFT)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::MissingCredential));
    }

    #[tokio::test]
    async fn blank_credential_counts_as_missing() {
        let backend = ChatBackend::new(BackendConfig {
            api_key: Some("   ".to_string()),
            ..BackendConfig::default()
        })
        .unwrap();
        let err = backend
            .generate("hello", GenerationParams::TITLE)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::MissingCredential));
    }
}
