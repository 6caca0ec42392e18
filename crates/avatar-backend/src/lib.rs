//! Backend gateway implementations — the network and audio collaborators
//! behind the `avatar-core` ports.
//!
//! - [`completion`]: OpenAI-compatible chat completion client with a
//!   bounded, randomized-exponential retry budget.
//! - [`stt`] / [`tts`]: HTTP speech-to-text and text-to-speech clients.
//! - [`capture`] / [`playback`]: microphone input via `cpal` and audio
//!   output via `rodio`.
//!
//! Everything here converts its failures into the `GatewayError`
//! taxonomy; nothing in this crate terminates a session.

pub mod capture;
pub mod completion;
pub mod playback;
pub mod stt;
pub mod tts;
pub mod wav;

pub use capture::MicrophoneCapture;
pub use completion::{CompletionConfig, OpenAiCompletionClient};
pub use stt::{HttpTranscriptionClient, TranscriptionConfig};
pub use tts::{HttpSynthesisClient, SynthesisConfig};
