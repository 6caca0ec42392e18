//! Text-to-speech client.
//!
//! Posts reply text to the synthesis service, receives WAV audio, and
//! plays it on the default output device. Callers treat any error as
//! "degrade to printed output" — synthesis never aborts a conversation.

use std::time::Duration;

use serde::Serialize;

use async_trait::async_trait;
use avatar_core::ports::{GatewayError, SynthesisPort};

use crate::playback::play_wav_bytes;

/// Configuration for the synthesis client.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Base URL of the text-to-speech service (no trailing slash).
    pub base_url: String,
    /// Bearer token, if the service requires one.
    pub api_key: Option<String>,
    /// Voice identifier sent with every request.
    pub voice_id: String,
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
}

/// HTTP synthesis client with local playback.
pub struct HttpSynthesisClient {
    client: reqwest::Client,
    config: SynthesisConfig,
}

impl HttpSynthesisClient {
    /// Create a client with the given configuration.
    ///
    /// # Errors
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new(config: SynthesisConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GatewayError::SynthesisFailed(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/synthesize", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SynthesisPort for HttpSynthesisClient {
    async fn speak(&self, text: &str) -> Result<(), GatewayError> {
        let body = SynthesisRequest { text, voice_id: &self.config.voice_id };

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::SynthesisFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::SynthesisFailed(format!("HTTP {status}")));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| GatewayError::SynthesisFailed(e.to_string()))?;

        tracing::debug!(bytes = audio.len(), "Playing synthesized reply");
        play_wav_bytes(audio.to_vec()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_text_and_voice() {
        let body = SynthesisRequest { text: "Hello there.", voice_id: "aria" };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["text"], "Hello there.");
        assert_eq!(json["voice_id"], "aria");
    }
}
