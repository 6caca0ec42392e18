//! OpenAI-compatible chat completion client.
//!
//! Sends the full ordered turn sequence on every call and reports the
//! backend's token usage. Transient failures (transport errors, 5xx) are
//! retried with randomized exponential backoff up to a small fixed budget;
//! everything else surfaces as `BackendUnavailable`.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use async_trait::async_trait;
use avatar_core::domain::{Completion, TokenUsage, Turn};
use avatar_core::ports::{CompletionPort, GatewayError};

/// Configuration for the completion client.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Base URL of the OpenAI-compatible API (no trailing slash).
    pub base_url: String,
    /// Bearer token, if the backend requires one.
    pub api_key: Option<String>,
    /// Model identifier sent with every request.
    pub model: String,
    /// Maximum number of retry attempts for transient errors.
    pub max_retries: u8,
    /// Base delay in milliseconds for exponential backoff.
    pub retry_base_delay_ms: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: avatar_core::settings::DEFAULT_MODEL.to_string(),
            max_retries: 3,
            retry_base_delay_ms: 500,
        }
    }
}

// ── Wire shapes ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

// ── Client ─────────────────────────────────────────────────────────

/// Production completion client over reqwest.
pub struct OpenAiCompletionClient {
    client: reqwest::Client,
    config: CompletionConfig,
}

impl OpenAiCompletionClient {
    /// Create a client with the given configuration.
    ///
    /// # Errors
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new(config: CompletionConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| GatewayError::BackendUnavailable(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn build_request(&self, body: &ChatCompletionRequest<'_>) -> reqwest::RequestBuilder {
        let mut request = self.client.post(self.endpoint()).json(body);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }
        request
    }
}

/// Backoff delay before retry `attempt` (1-based), with random jitter up
/// to half the base delay.
fn backoff_delay(base_ms: u64, attempt: u8, jitter_ms: u64) -> Duration {
    Duration::from_millis(base_ms * 2u64.pow(u32::from(attempt) - 1) + jitter_ms)
}

#[async_trait]
impl CompletionPort for OpenAiCompletionClient {
    async fn complete(&self, turns: &[Turn]) -> Result<Completion, GatewayError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: turns
                .iter()
                .map(|t| WireMessage { role: t.role.as_str(), content: &t.text })
                .collect(),
        };

        let mut last_error = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let jitter = rand::thread_rng().gen_range(0..=self.config.retry_base_delay_ms / 2);
                let delay = backoff_delay(self.config.retry_base_delay_ms, attempt, jitter);
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying completion");
                tokio::time::sleep(delay).await;
            }

            match self.build_request(&body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let parsed: ChatCompletionResponse = response
                            .json()
                            .await
                            .map_err(|e| GatewayError::BackendUnavailable(e.to_string()))?;
                        return extract_completion(parsed);
                    }

                    // 5xx errors are retryable (server-side issues)
                    if status.is_server_error() && attempt < self.config.max_retries {
                        last_error = format!("HTTP {status}");
                        continue;
                    }

                    // 4xx errors or final attempt - fail immediately
                    return Err(GatewayError::BackendUnavailable(format!("HTTP {status}")));
                }
                Err(e) => {
                    // Network errors are retryable
                    if attempt < self.config.max_retries {
                        last_error = e.to_string();
                        continue;
                    }
                    return Err(GatewayError::BackendUnavailable(e.to_string()));
                }
            }
        }

        Err(GatewayError::BackendUnavailable(last_error))
    }
}

fn extract_completion(response: ChatCompletionResponse) -> Result<Completion, GatewayError> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| GatewayError::BackendUnavailable("response carried no choices".into()))?;

    let usage = response.usage.map_or_else(TokenUsage::default, |u| TokenUsage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
    });

    Ok(Completion { text, usage })
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_core::domain::Role;

    #[test]
    fn request_serializes_to_openai_shape() {
        let turns = [Turn::system("persona"), Turn::user("Hi")];
        let body = ChatCompletionRequest {
            model: "test-model",
            messages: turns
                .iter()
                .map(|t| WireMessage { role: t.role.as_str(), content: &t.text })
                .collect(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "test-model");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Hi");
    }

    #[test]
    fn response_parses_text_and_usage() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Hello there."}}],
            "usage": {"prompt_tokens": 21, "completion_tokens": 4}
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        let completion = extract_completion(parsed).unwrap();
        assert_eq!(completion.text, "Hello there.");
        assert_eq!(completion.usage.prompt_tokens, 21);
        assert_eq!(completion.usage.completion_tokens, 4);
    }

    #[test]
    fn empty_choices_is_an_error() {
        let parsed: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            extract_completion(parsed),
            Err(GatewayError::BackendUnavailable(_))
        ));
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(backoff_delay(500, 1, 0), Duration::from_millis(500));
        assert_eq!(backoff_delay(500, 2, 0), Duration::from_millis(1000));
        assert_eq!(backoff_delay(500, 3, 7), Duration::from_millis(2007));
    }

    #[test]
    fn roles_map_to_wire_strings() {
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }
}
