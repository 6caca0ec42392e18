//! Speech-to-text client.
//!
//! Uploads one captured clip as WAV and returns the transcript. An empty
//! transcript maps to `Ok(None)` — "heard nothing" is a normal outcome,
//! not an error. Transport failures surface as `SpeechServiceUnavailable`
//! and the session's re-listen policy takes over; no retry happens here.

use std::time::Duration;

use serde::Deserialize;

use async_trait::async_trait;
use avatar_core::ports::{AudioClip, GatewayError, TranscriptionPort};

use crate::wav::encode_wav;

/// Configuration for the transcription client.
#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    /// Base URL of the speech-to-text service (no trailing slash).
    pub base_url: String,
    /// Bearer token, if the service requires one.
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    transcript: String,
}

/// HTTP transcription client.
pub struct HttpTranscriptionClient {
    client: reqwest::Client,
    config: TranscriptionConfig,
}

impl HttpTranscriptionClient {
    /// Create a client with the given configuration.
    ///
    /// # Errors
    /// Fails only if the HTTP client cannot be constructed.
    pub fn new(config: TranscriptionConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GatewayError::SpeechServiceUnavailable(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/transcribe", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TranscriptionPort for HttpTranscriptionClient {
    async fn transcribe(
        &self,
        audio: AudioClip,
        language: &str,
    ) -> Result<Option<String>, GatewayError> {
        let wav = encode_wav(&audio)?;
        tracing::debug!(
            bytes = wav.len(),
            language,
            secs = audio.duration().as_secs_f32(),
            "Uploading clip for transcription"
        );

        let part = reqwest::multipart::Part::bytes(wav)
            .file_name("clip.wav")
            .mime_str("audio/wav")
            .map_err(|e| GatewayError::SpeechServiceUnavailable(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("audio", part)
            .text("language", language.to_string());

        let mut request = self.client.post(self.endpoint()).multipart(form);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::SpeechServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::SpeechServiceUnavailable(format!("HTTP {status}")));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::SpeechServiceUnavailable(e.to_string()))?;

        let transcript = parsed.transcript.trim().to_string();
        if transcript.is_empty() {
            Ok(None)
        } else {
            Ok(Some(transcript))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_transcript_field_defaults_to_empty() {
        let parsed: TranscriptionResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.transcript.is_empty());
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let client = HttpTranscriptionClient::new(TranscriptionConfig {
            base_url: "http://localhost:8178/".to_string(),
            api_key: None,
        })
        .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8178/v1/transcribe");
    }
}
