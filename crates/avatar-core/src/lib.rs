//! Core domain types, port definitions, and settings for the avatar
//! chat system.
//!
//! This crate is infrastructure-free: it defines the shapes the rest of
//! the workspace agrees on (turns, backstory, token usage), the trait
//! boundaries to external services and storage (`ports`), and the
//! application settings. Concrete implementations live in
//! `avatar-backend` and `avatar-store`; composition happens in
//! `avatar-cli`.

pub mod domain;
pub mod ports;
pub mod settings;

// Re-export key types for convenience
pub use domain::{Backstory, BackstoryEntry, Completion, Role, TokenUsage, Turn};
pub use ports::{
    AudioClip, BackstoryRepository, CapturePort, CompletionPort, GatewayError, StoreError,
    SynthesisPort, TranscriptRecord, TranscriptStore, TranscriptionPort,
};
pub use settings::AvatarSettings;
