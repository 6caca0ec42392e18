//! Port definitions — the trait boundaries between the session core and
//! its collaborators.
//!
//! # Design Rules
//!
//! - Ports carry domain types only; wire shapes (JSON bodies, CSV rows)
//!   live with their implementations.
//! - Every external failure is classified here, so callers can apply the
//!   recovery policy the session requires without inspecting transport
//!   errors.

pub mod gateway;
pub mod store;

pub use gateway::{AudioClip, CapturePort, CompletionPort, GatewayError, SynthesisPort, TranscriptionPort};
pub use store::{BackstoryRepository, StoreError, TranscriptRecord, TranscriptStore};
