//! Backend gateway ports — completion, transcription, synthesis, capture.
//!
//! These traits form the abstraction boundary over all third-party
//! services. The session core only ever sees these signatures; transport,
//! retry policy, and audio plumbing are implementation concerns of
//! `avatar-backend`.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Completion, Turn};

/// Errors that can occur at the backend gateway boundary.
///
/// The session treats every variant except [`GatewayError::NoInputDevice`]
/// as recoverable: completion failures skip the reply, speech-service
/// failures re-prompt, synthesis failures degrade to printed output.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The completion backend could not be reached or returned an error
    /// after the retry budget was exhausted.
    #[error("Completion backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The speech-to-text service could not be reached.
    #[error("Speech service unavailable: {0}")]
    SpeechServiceUnavailable(String),

    /// Speech synthesis failed; callers degrade to printed output.
    #[error("Speech synthesis failed: {0}")]
    SynthesisFailed(String),

    /// No audio input device found. Fatal at setup, never mid-session.
    #[error("No audio input device found")]
    NoInputDevice,

    /// Failed to open or drive the audio input stream.
    #[error("Audio input stream error: {0}")]
    InputStream(String),

    /// Failed to open or drive the audio output stream.
    #[error("Audio output stream error: {0}")]
    OutputStream(String),

    /// IO error (audio encoding, temp files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A captured audio clip: mono PCM samples at a fixed sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// Mono f32 PCM samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioClip {
    /// Duration of the clip.
    #[must_use]
    pub fn duration(&self) -> std::time::Duration {
        if self.sample_rate == 0 {
            return std::time::Duration::ZERO;
        }
        std::time::Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.sample_rate))
    }
}

/// Port for chat completion calls.
///
/// The full ordered turn sequence is sent every call — the model always
/// sees the fixed system turn and all prior exchanges. Unbounded growth
/// is a known, accepted limitation.
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Produce one reply for the given transcript, with token usage.
    async fn complete(&self, turns: &[Turn]) -> Result<Completion, GatewayError>;
}

/// Port for speech-to-text transcription.
#[async_trait]
pub trait TranscriptionPort: Send + Sync {
    /// Transcribe a captured clip in the given BCP-47 language.
    ///
    /// Returns `Ok(None)` when the audio contains no recognizable speech —
    /// that is not an error, the caller simply re-listens.
    async fn transcribe(
        &self,
        audio: AudioClip,
        language: &str,
    ) -> Result<Option<String>, GatewayError>;
}

/// Port for speech synthesis and playback.
#[async_trait]
pub trait SynthesisPort: Send + Sync {
    /// Synthesize `text` and play it on the default output device.
    ///
    /// Failures are returned so the caller can degrade to printing; they
    /// must never abort a conversation.
    async fn speak(&self, text: &str) -> Result<(), GatewayError>;
}

/// Port for microphone capture.
#[async_trait]
pub trait CapturePort: Send + Sync {
    /// Perform one bounded-duration listen.
    ///
    /// Returns `Ok(None)` when no speech started within the timeout.
    /// Mutual exclusion of concurrent listens is the caller's job (the
    /// session's `recording` latch), not the capture's.
    async fn listen(
        &self,
        timeout: std::time::Duration,
    ) -> Result<Option<AudioClip>, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_duration_from_sample_count() {
        let clip = AudioClip { samples: vec![0.0; 16_000], sample_rate: 16_000 };
        assert_eq!(clip.duration(), std::time::Duration::from_secs(1));
    }

    #[test]
    fn zero_rate_clip_has_zero_duration() {
        let clip = AudioClip { samples: vec![0.0; 100], sample_rate: 0 };
        assert_eq!(clip.duration(), std::time::Duration::ZERO);
    }
}
