//! Typed session events.
//!
//! Key presses arrive from a background listener as values on an ordered
//! channel rather than callbacks poking shared state — the event pump in
//! the controller is the only consumer, which makes ordering explicit and
//! keeps latch discipline in one place.

/// An asynchronous command for the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Switch the spoken language for subsequent capture cycles.
    SwitchLanguage(String),

    /// Request cooperative session exit.
    RequestExit,

    /// Start a voice capture cycle. Ignored while one is in flight.
    StartCapture,
}
