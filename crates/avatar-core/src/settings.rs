//! Settings types and defaults.
//!
//! Pure domain types with no infrastructure dependencies. Loading from
//! disk and environment-variable overrides happen in the CLI bootstrap.

use serde::{Deserialize, Serialize};

/// Default bounded-duration listen window for one voice capture, seconds.
pub const DEFAULT_SPEECH_TIMEOUT_SECS: u64 = 6;

/// Default completion model identifier.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Application settings.
///
/// All fields have defaults so a missing or partial settings file still
/// yields a usable configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AvatarSettings {
    /// Display name of the avatar persona.
    pub avatar_name: String,

    /// Display name of the human interlocutor.
    pub interlocutor_name: String,

    /// Completion model identifier.
    pub model: String,

    /// Base URL of the OpenAI-compatible completion API.
    pub completion_base_url: String,

    /// API key for the completion API. Usually supplied via the
    /// `AVATAR_COMPLETION_API_KEY` environment variable instead.
    pub completion_api_key: Option<String>,

    /// Base URL of the speech-to-text service.
    pub stt_base_url: String,

    /// Base URL of the text-to-speech service.
    pub tts_base_url: String,

    /// API key for the speech services (`AVATAR_SPEECH_API_KEY`).
    pub speech_api_key: Option<String>,

    /// Voice identifier for synthesis.
    pub tts_voice_id: String,

    /// Bounded-duration listen window for one voice capture, seconds.
    pub speech_timeout_secs: u64,

    /// Supported spoken languages, BCP-47 tags, in key-binding order.
    /// The first entry is the session default.
    pub languages: Vec<String>,

    /// When true, voice captures are started by a key press instead of
    /// automatically re-listening after a timeout.
    pub keyboard_capture: bool,

    /// Path of the backstory CSV log.
    pub backstory_path: String,

    /// Path of the transcript CSV log.
    pub transcript_path: String,

    /// Price per 1k prompt tokens, for the end-of-session cost summary.
    pub prompt_price_per_1k: Option<f64>,

    /// Price per 1k completion tokens.
    pub completion_price_per_1k: Option<f64>,
}

impl Default for AvatarSettings {
    fn default() -> Self {
        Self {
            avatar_name: "Alex".to_string(),
            interlocutor_name: "You".to_string(),
            model: DEFAULT_MODEL.to_string(),
            completion_base_url: "https://api.openai.com/v1".to_string(),
            completion_api_key: None,
            stt_base_url: "http://localhost:8178".to_string(),
            tts_base_url: "http://localhost:8179".to_string(),
            speech_api_key: None,
            tts_voice_id: "default".to_string(),
            speech_timeout_secs: DEFAULT_SPEECH_TIMEOUT_SECS,
            languages: vec!["en-US".to_string()],
            keyboard_capture: false,
            backstory_path: "answers.csv".to_string(),
            transcript_path: "transcript.csv".to_string(),
            prompt_price_per_1k: None,
            completion_price_per_1k: None,
        }
    }
}

impl AvatarSettings {
    /// The session's default spoken language.
    #[must_use]
    pub fn default_language(&self) -> &str {
        self.languages.first().map_or("en-US", String::as_str)
    }

    /// Estimated cost for the given token totals, when prices are set.
    #[must_use]
    pub fn estimated_cost(&self, prompt_tokens: u64, completion_tokens: u64) -> Option<f64> {
        let prompt = self.prompt_price_per_1k? * prompt_tokens as f64 / 1000.0;
        let completion = self.completion_price_per_1k? * completion_tokens as f64 / 1000.0;
        Some(prompt + completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let settings = AvatarSettings::default();
        assert_eq!(settings.default_language(), "en-US");
        assert_eq!(settings.speech_timeout_secs, DEFAULT_SPEECH_TIMEOUT_SECS);
        assert!(!settings.keyboard_capture);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let settings: AvatarSettings =
            serde_json::from_str(r#"{"avatar_name": "Maya", "languages": ["fr-FR", "en-US"]}"#)
                .unwrap();
        assert_eq!(settings.avatar_name, "Maya");
        assert_eq!(settings.default_language(), "fr-FR");
        assert_eq!(settings.model, DEFAULT_MODEL);
    }

    #[test]
    fn cost_requires_both_prices() {
        let mut settings = AvatarSettings::default();
        assert_eq!(settings.estimated_cost(1000, 1000), None);

        settings.prompt_price_per_1k = Some(0.5);
        settings.completion_price_per_1k = Some(1.5);
        let cost = settings.estimated_cost(2000, 1000).unwrap();
        assert!((cost - 2.5).abs() < f64::EPSILON);
    }
}
