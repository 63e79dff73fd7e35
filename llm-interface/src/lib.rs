pub mod persona;

pub use persona::{persona_prompt, PersonaGenerator};

use async_trait::async_trait;
use persona_core::{AppConfig, CoreError, LlmError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const CHAT_COMPLETIONS_ENDPOINT: &str = "/v1/chat/completions";
const OPENAI: &str = "openai";

/// A hosted text-completion model: one prompt in, one completion out.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String, CoreError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorEnvelope {
    #[serde(default)]
    error: ApiErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    code: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl ApiErrorBody {
    fn is(&self, name: &str) -> bool {
        self.code.as_deref() == Some(name) || self.kind.as_deref() == Some(name)
    }
}

/// OpenAI chat-completion client. Sends the prompt as a single user message.
pub struct OpenAiProvider {
    http_client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiProvider {
    pub fn new(config: &AppConfig) -> Result<Self, CoreError> {
        let mut builder = Client::builder();
        if let Some(seconds) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self {
            http_client: builder.build()?,
            api_key: config.openai_api_key.clone(),
            base_url: config.llm.base_url.trim_end_matches('/').to_string(),
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
        })
    }

    fn error_for_status(&self, status: StatusCode, retry_after: Option<u64>, body: &str) -> LlmError {
        let api_error = serde_json::from_str::<ApiErrorEnvelope>(body)
            .unwrap_or_default()
            .error;
        if let Some(message) = &api_error.message {
            warn!("OpenAI error response ({}): {}", status, message);
        }

        let provider = OPENAI.to_string();
        match status.as_u16() {
            401 if self.api_key.is_none() => LlmError::InvalidApiKey { provider },
            401 | 403 => LlmError::AuthenticationFailed { provider },
            429 if api_error.is("insufficient_quota") => LlmError::InsufficientCredits { provider },
            429 => LlmError::RateLimitExceeded {
                provider,
                retry_after: retry_after.unwrap_or(20),
            },
            404 if api_error.is("model_not_found") => LlmError::ModelNotAvailable {
                model: self.model.clone(),
            },
            400 if api_error.is("content_filter") => LlmError::ContentFiltered {
                reason: api_error.message.unwrap_or_default(),
            },
            code if (500..600).contains(&code) => LlmError::ServiceUnavailable { provider },
            _ => LlmError::InvalidResponseFormat { provider },
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        OPENAI
    }

    async fn complete(&self, prompt: &str) -> Result<String, CoreError> {
        let url = format!("{}{}", self.base_url, CHAT_COMPLETIONS_ENDPOINT);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let mut request_builder = self.http_client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        info!(
            "Requesting chat completion from {} ({} prompt chars)",
            self.model,
            prompt.len()
        );
        let response = request_builder.send().await.map_err(|e| {
            error!("Network error calling chat completions: {}", e);
            if e.is_timeout() {
                CoreError::Llm(LlmError::RequestTimeout {
                    provider: OPENAI.to_string(),
                })
            } else {
                CoreError::Network(e)
            }
        })?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CoreError::Llm(self.error_for_status(status, retry_after, &body)));
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse chat completion: {}", e);
            CoreError::Llm(LlmError::InvalidResponseFormat {
                provider: OPENAI.to_string(),
            })
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| {
                error!("Chat completion has no message content");
                CoreError::Llm(LlmError::InvalidResponseFormat {
                    provider: OPENAI.to_string(),
                })
            })?;

        debug!("Completion returned {} chars", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn provider_for(server: &MockServer, api_key: Option<&str>) -> OpenAiProvider {
        let mut config = AppConfig::default();
        config.llm.base_url = server.base_url();
        config.openai_api_key = api_key.map(str::to_string);
        OpenAiProvider::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-test")
                .body_contains("\"role\":\"user\"")
                .body_contains("\"model\":\"gpt-3.5-turbo\"")
                .body_contains("\"temperature\":0.7")
                .body_contains("describe me");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"choices":[{"message":{"role":"assistant","content":"  A curious engineer.  "}},{"message":{"content":"second"}}]}"#);
        });

        let provider = provider_for(&server, Some("sk-test"));
        let text = provider.complete("describe me").await.unwrap();
        mock.assert();
        assert_eq!(text, "  A curious engineer.  ");
    }

    #[tokio::test]
    async fn test_insufficient_quota() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(429).body(
                r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","code":"insufficient_quota"}}"#,
            );
        });

        let provider = provider_for(&server, Some("sk-test"));
        let result = provider.complete("prompt").await;
        assert!(matches!(
            result,
            Err(CoreError::Llm(LlmError::InsufficientCredits { .. }))
        ));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(429)
                .header("retry-after", "7")
                .body(r#"{"error":{"message":"slow down","code":"rate_limit_exceeded"}}"#);
        });

        let provider = provider_for(&server, Some("sk-test"));
        match provider.complete("prompt").await {
            Err(CoreError::Llm(LlmError::RateLimitExceeded { retry_after, .. })) => {
                assert_eq!(retry_after, 7)
            }
            other => panic!("Expected RateLimitExceeded, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_key_surfaces_as_auth_failure() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(401)
                .body(r#"{"error":{"message":"You didn't provide an API key."}}"#);
        });

        let provider = provider_for(&server, None);
        let result = provider.complete("prompt").await;
        assert!(matches!(
            result,
            Err(CoreError::Llm(LlmError::InvalidApiKey { .. }))
        ));
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).body(r#"{"choices":[]}"#);
        });

        let provider = provider_for(&server, Some("sk-test"));
        let result = provider.complete("prompt").await;
        assert!(matches!(
            result,
            Err(CoreError::Llm(LlmError::InvalidResponseFormat { .. }))
        ));
    }

    #[tokio::test]
    async fn test_null_content() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .body(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#);
        });

        let provider = provider_for(&server, Some("sk-test"));
        let result = provider.complete("prompt").await;
        assert!(matches!(
            result,
            Err(CoreError::Llm(LlmError::InvalidResponseFormat { .. }))
        ));
    }

    #[tokio::test]
    async fn test_blank_content_is_returned() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .body(r#"{"choices":[{"message":{"role":"assistant","content":"   "}}]}"#);
        });

        let provider = provider_for(&server, Some("sk-test"));
        assert_eq!(provider.complete("prompt").await.unwrap(), "   ");
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(503).body("upstream down");
        });

        let provider = provider_for(&server, Some("sk-test"));
        let result = provider.complete("prompt").await;
        assert!(matches!(
            result,
            Err(CoreError::Llm(LlmError::ServiceUnavailable { .. }))
        ));
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).body("not json");
        });

        let provider = provider_for(&server, Some("sk-test"));
        let result = provider.complete("prompt").await;
        assert!(matches!(
            result,
            Err(CoreError::Llm(LlmError::InvalidResponseFormat { .. }))
        ));
    }
}
