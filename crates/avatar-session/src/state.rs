//! Shared session state.
//!
//! One `SessionState` is shared between the session loop, the turn
//! worker, and the key-event pump. Every mutation is idempotent, and no
//! lock is ever held across a network call — callers snapshot the turn
//! list before talking to the backend.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use avatar_core::domain::{TokenUsage, Turn};

/// How user utterances are produced. Fixed for the session duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Text,
    Voice,
}

/// How avatar replies are emitted. Fixed for the session duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Speech,
}

/// Mutable record shared by all session actors.
pub struct SessionState {
    /// Ordered transcript. The first turn is the single system turn
    /// establishing the persona; it is never mutated after creation.
    turns: Mutex<Vec<Turn>>,

    prompt_tokens: AtomicU64,
    completion_tokens: AtomicU64,

    input_mode: InputMode,
    output_mode: OutputMode,

    /// Current spoken language (BCP-47). Mutable only in voice mode;
    /// switches take effect on the next capture cycle.
    language: Mutex<String>,

    /// Cooperative cancellation flag. Monotonic false→true, never reset.
    exit_requested: AtomicBool,

    /// Mutual-exclusion latch: true only while a voice capture cycle
    /// (and the turn it produces) is in flight.
    recording: AtomicBool,

    exit_notify: Notify,
}

impl SessionState {
    /// Create session state seeded with the system turn.
    #[must_use]
    pub fn new(
        input_mode: InputMode,
        output_mode: OutputMode,
        language: impl Into<String>,
        system_text: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            turns: Mutex::new(vec![Turn::system(system_text)]),
            prompt_tokens: AtomicU64::new(0),
            completion_tokens: AtomicU64::new(0),
            input_mode,
            output_mode,
            language: Mutex::new(language.into()),
            exit_requested: AtomicBool::new(false),
            recording: AtomicBool::new(false),
            exit_notify: Notify::new(),
        })
    }

    pub const fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub const fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    // ── Transcript ─────────────────────────────────────────────────

    /// Append a user turn.
    pub fn push_user(&self, text: impl Into<String>) {
        self.push(Turn::user(text));
    }

    /// Append an assistant turn.
    pub fn push_assistant(&self, text: impl Into<String>) {
        self.push(Turn::assistant(text));
    }

    // Lock poisoning propagates the panic; a dropped turn or an empty
    // snapshot would silently corrupt the next completion call.
    fn push(&self, turn: Turn) {
        self.turns.lock().unwrap().push(turn);
    }

    /// Clone the full ordered turn sequence. Taken before every backend
    /// call so the turns lock never spans a network wait.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.lock().unwrap().clone()
    }

    /// Number of turns, including the system turn.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.turns.lock().unwrap().len()
    }

    // ── Token counters ─────────────────────────────────────────────

    /// Accumulate token usage from one completion call.
    pub fn add_usage(&self, usage: TokenUsage) {
        self.prompt_tokens.fetch_add(usage.prompt_tokens, Ordering::Relaxed);
        self.completion_tokens.fetch_add(usage.completion_tokens, Ordering::Relaxed);
    }

    /// Running totals across the session.
    #[must_use]
    pub fn usage(&self) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens.load(Ordering::Relaxed),
            completion_tokens: self.completion_tokens.load(Ordering::Relaxed),
        }
    }

    // ── Language ───────────────────────────────────────────────────

    #[must_use]
    pub fn language(&self) -> String {
        self.language.lock().unwrap().clone()
    }

    /// Switch the spoken language. Safe to call mid-capture; the new
    /// value is read at the start of the next cycle.
    pub fn set_language(&self, tag: impl Into<String>) {
        let tag = tag.into();
        let mut language = self.language.lock().unwrap();
        if *language != tag {
            tracing::info!(language = %tag, "Spoken language switched");
            *language = tag;
        }
    }

    // ── Exit flag ──────────────────────────────────────────────────

    /// Request session exit. Idempotent; wakes any waiter.
    pub fn request_exit(&self) {
        if !self.exit_requested.swap(true, Ordering::SeqCst) {
            tracing::debug!("Exit requested");
        }
        self.exit_notify.notify_one();
    }

    #[must_use]
    pub fn exit_requested(&self) -> bool {
        self.exit_requested.load(Ordering::SeqCst)
    }

    /// Wait until exit has been requested.
    pub async fn wait_exit(&self) {
        while !self.exit_requested() {
            self.exit_notify.notified().await;
        }
    }

    // ── Recording latch ────────────────────────────────────────────

    /// Try to acquire the capture latch. Returns `None` when a capture
    /// cycle is already in flight — the caller must not start another.
    #[must_use]
    pub fn begin_capture(self: &Arc<Self>) -> Option<CaptureGuard> {
        if self
            .recording
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Some(CaptureGuard { state: Arc::clone(self) })
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }
}

/// Holds the `recording` latch; releases it on drop, so the latch is
/// freed on every path out of a capture cycle.
pub struct CaptureGuard {
    state: Arc<SessionState>,
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.state.recording.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_core::domain::Role;

    fn state() -> Arc<SessionState> {
        SessionState::new(InputMode::Text, OutputMode::Text, "en-US", "persona")
    }

    #[test]
    fn first_turn_is_the_system_turn() {
        let state = state();
        state.push_user("Hi");
        let turns = state.snapshot();
        assert_eq!(turns[0].role, Role::System);
        assert_eq!(turns[0].text, "persona");
        assert_eq!(turns[1].role, Role::User);
    }

    #[test]
    fn usage_accumulates_monotonically() {
        let state = state();
        state.add_usage(TokenUsage { prompt_tokens: 10, completion_tokens: 5 });
        state.add_usage(TokenUsage { prompt_tokens: 7, completion_tokens: 3 });
        assert_eq!(state.usage(), TokenUsage { prompt_tokens: 17, completion_tokens: 8 });
    }

    #[test]
    fn exit_request_is_idempotent() {
        let state = state();
        state.request_exit();
        let after_first = state.exit_requested();
        state.request_exit();
        assert!(after_first);
        assert!(state.exit_requested());
    }

    #[test]
    fn second_capture_start_is_a_no_op() {
        let state = state();
        let guard = state.begin_capture().expect("latch free");
        assert!(state.is_recording());
        assert!(state.begin_capture().is_none());
        drop(guard);
        assert!(!state.is_recording());
        assert!(state.begin_capture().is_some());
    }

    #[test]
    fn language_switch_applies_for_next_read() {
        let state = state();
        state.set_language("fr-FR");
        assert_eq!(state.language(), "fr-FR");
        // idempotent re-application
        state.set_language("fr-FR");
        assert_eq!(state.language(), "fr-FR");
    }

    #[test]
    fn concurrent_pushes_are_all_retained() {
        let state = state();
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| state.push_user("hi"));
            }
        });
        // System turn plus every pushed turn; none silently dropped.
        assert_eq!(state.turn_count(), 9);
        assert_eq!(state.snapshot().len(), 9);
    }

    #[tokio::test]
    async fn wait_exit_returns_after_request() {
        let state = state();
        let waiter = {
            let state = Arc::clone(&state);
            tokio::spawn(async move { state.wait_exit().await })
        };
        state.request_exit();
        waiter.await.unwrap();
    }
}
