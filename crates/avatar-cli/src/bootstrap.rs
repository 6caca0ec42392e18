//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together:
//! CSV stores (via avatar-store), HTTP clients and audio devices (via
//! avatar-backend). Command handlers receive the composed [`CliContext`]
//! and never construct infrastructure themselves.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use avatar_backend::{
    CompletionConfig, HttpSynthesisClient, HttpTranscriptionClient, MicrophoneCapture,
    OpenAiCompletionClient, SynthesisConfig, TranscriptionConfig,
};
use avatar_core::AvatarSettings;
use avatar_core::ports::{
    BackstoryRepository, CapturePort, CompletionPort, SynthesisPort, TranscriptStore,
    TranscriptionPort,
};
use avatar_store::{CsvBackstoryStore, CsvTranscriptStore};

/// Environment variable overriding the completion API key.
pub const COMPLETION_API_KEY_VAR: &str = "AVATAR_COMPLETION_API_KEY";

/// Environment variable overriding the speech-services API key.
pub const SPEECH_API_KEY_VAR: &str = "AVATAR_SPEECH_API_KEY";

/// Load settings from the given JSON file, falling back to defaults when
/// the file is absent, then apply environment-variable key overrides.
pub fn load_settings(path: &Path) -> Result<AvatarSettings> {
    let mut settings = if path.exists() {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Malformed settings file {}", path.display()))?
    } else {
        tracing::debug!(path = %path.display(), "No settings file; using defaults");
        AvatarSettings::default()
    };

    if let Ok(key) = std::env::var(COMPLETION_API_KEY_VAR) {
        settings.completion_api_key = Some(key);
    }
    if let Ok(key) = std::env::var(SPEECH_API_KEY_VAR) {
        settings.speech_api_key = Some(key);
    }

    Ok(settings)
}

/// Fully composed application context for command handlers.
pub struct CliContext {
    pub settings: AvatarSettings,
    pub completion: Arc<dyn CompletionPort>,
    pub transcription: Arc<dyn TranscriptionPort>,
    pub synthesis: Arc<dyn SynthesisPort>,
    pub capture: Arc<dyn CapturePort>,
    pub backstory: Arc<dyn BackstoryRepository>,
    pub transcript: Arc<dyn TranscriptStore>,
}

/// Compose all infrastructure from settings.
///
/// Audio hardware is not opened here; [`MicrophoneCapture::probe`] runs
/// in the chat handler once voice input is actually selected.
pub fn bootstrap(settings: AvatarSettings) -> Result<CliContext> {
    let completion = OpenAiCompletionClient::new(CompletionConfig {
        base_url: settings.completion_base_url.clone(),
        api_key: settings.completion_api_key.clone(),
        model: settings.model.clone(),
        ..CompletionConfig::default()
    })
    .context("Failed to build the completion client")?;

    let transcription = HttpTranscriptionClient::new(TranscriptionConfig {
        base_url: settings.stt_base_url.clone(),
        api_key: settings.speech_api_key.clone(),
    })
    .context("Failed to build the transcription client")?;

    let synthesis = HttpSynthesisClient::new(SynthesisConfig {
        base_url: settings.tts_base_url.clone(),
        api_key: settings.speech_api_key.clone(),
        voice_id: settings.tts_voice_id.clone(),
    })
    .context("Failed to build the synthesis client")?;

    let backstory = CsvBackstoryStore::new(&settings.backstory_path);
    let transcript = CsvTranscriptStore::new(&settings.transcript_path);

    Ok(CliContext {
        settings,
        completion: Arc::new(completion),
        transcription: Arc::new(transcription),
        synthesis: Arc::new(synthesis),
        capture: Arc::new(MicrophoneCapture::new()),
        backstory: Arc::new(backstory),
        transcript: Arc::new(transcript),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_settings_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, AvatarSettings::default());
    }

    #[test]
    fn settings_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.json");
        std::fs::write(&path, r#"{"avatar_name": "Maya", "keyboard_capture": true}"#).unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.avatar_name, "Maya");
        assert!(settings.keyboard_capture);
    }

    #[test]
    fn malformed_settings_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_settings(&path).is_err());
    }
}
