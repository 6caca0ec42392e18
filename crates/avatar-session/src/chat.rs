//! Chat session controller — owns the main loop.
//!
//! Responsibilities: run the mode-appropriate loop until exit, pump key
//! events into state flags, enforce single-flight voice turns via the
//! capture latch, and serialize text-mode turn processing through one
//! worker so the persisted transcript order equals submission order.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use avatar_core::domain::TokenUsage;

use crate::events::SessionEvent;
use crate::input::InputController;
use crate::state::{InputMode, SessionState};
use crate::turn::{ReplyPresenter, TurnProcessor};

/// Default exit keywords recognized in text mode.
pub const EXIT_KEYWORDS: [&str; 2] = ["exit", "quit"];

/// Errors that can end a session abnormally.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The serial turn worker panicked; the transcript may be truncated.
    #[error("Turn worker failed: {0}")]
    TurnWorker(String),

    /// The controller was composed without the source its input mode needs.
    #[error("Session misconfigured: {0}")]
    Misconfigured(&'static str),
}

/// Final token totals reported when the session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub usage: TokenUsage,
}

/// The session orchestrator.
pub struct ChatSessionController {
    state: Arc<SessionState>,
    processor: Arc<TurnProcessor>,
    /// Voice input; absent in text-only sessions.
    input: Option<InputController>,
    presenter: Arc<dyn ReplyPresenter>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    /// Foreground text lines; absent in voice sessions.
    lines: Option<mpsc::UnboundedReceiver<String>>,
    interlocutor_name: String,
}

impl ChatSessionController {
    #[must_use]
    pub fn new(
        state: Arc<SessionState>,
        processor: Arc<TurnProcessor>,
        input: Option<InputController>,
        presenter: Arc<dyn ReplyPresenter>,
        events: mpsc::UnboundedReceiver<SessionEvent>,
        lines: Option<mpsc::UnboundedReceiver<String>>,
        interlocutor_name: impl Into<String>,
    ) -> Self {
        Self {
            state,
            processor,
            input,
            presenter,
            events,
            lines,
            interlocutor_name: interlocutor_name.into(),
        }
    }

    /// Run the session until exit is requested, then drain in-flight work
    /// and report final totals.
    pub async fn run(mut self) -> Result<SessionSummary, SessionError> {
        // Event pump: applies language/exit events to state immediately —
        // even while a capture or network call is in flight — and forwards
        // capture-start requests to the loop. Dropped StartCaptures while
        // recording keep the latch a strict no-op path.
        let (capture_tx, mut capture_rx) = mpsc::unbounded_channel::<()>();
        let pump = {
            let state = Arc::clone(&self.state);
            let mut events = self.events;
            tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    match event {
                        SessionEvent::RequestExit => state.request_exit(),
                        SessionEvent::SwitchLanguage(tag) => state.set_language(tag),
                        SessionEvent::StartCapture => {
                            if !state.is_recording() {
                                let _ = capture_tx.send(());
                            }
                        }
                    }
                }
            })
        };

        let result = match self.state.input_mode() {
            InputMode::Text => match self.lines.take() {
                Some(lines) => run_text_loop(&self.state, &self.processor, lines).await,
                None => Err(SessionError::Misconfigured("text input requires a line source")),
            },
            InputMode::Voice => match self.input.take() {
                Some(input) => {
                    run_voice_loop(
                        &self.state,
                        &self.processor,
                        &input,
                        &*self.presenter,
                        &self.interlocutor_name,
                        &mut capture_rx,
                    )
                    .await;
                    Ok(())
                }
                None => Err(SessionError::Misconfigured("voice input requires an input controller")),
            },
        };

        pump.abort();
        result?;

        let summary = SessionSummary { usage: self.state.usage() };
        tracing::info!(
            prompt_tokens = summary.usage.prompt_tokens,
            completion_tokens = summary.usage.completion_tokens,
            turns = self.state.turn_count(),
            "Session ended"
        );
        Ok(summary)
    }
}

/// Text mode: accept lines without waiting on replies; a single serial
/// worker processes them, so transcript appends happen in submission
/// order. On exit the queue is closed and the worker drained before the
/// summary — no truncated transcript, no lost final reply.
async fn run_text_loop(
    state: &Arc<SessionState>,
    processor: &Arc<TurnProcessor>,
    mut lines: mpsc::UnboundedReceiver<String>,
) -> Result<(), SessionError> {
    let (queue_tx, mut queue_rx) = mpsc::unbounded_channel::<String>();
    let worker = {
        let processor = Arc::clone(processor);
        tokio::spawn(async move {
            while let Some(utterance) = queue_rx.recv().await {
                processor.process(utterance).await;
            }
        })
    };

    loop {
        tokio::select! {
            line = lines.recv() => {
                match line {
                    None => {
                        state.request_exit();
                        break;
                    }
                    Some(line) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        if EXIT_KEYWORDS.contains(&trimmed.to_lowercase().as_str()) {
                            state.request_exit();
                            break;
                        }
                        let _ = queue_tx.send(trimmed.to_string());
                    }
                }
            }
            () = state.wait_exit() => break,
        }
    }

    drop(queue_tx);
    worker
        .await
        .map_err(|e| SessionError::TurnWorker(e.to_string()))
}

/// Voice mode: one capture cycle and one turn at a time. With keyboard
/// capture, cycles start on key press; otherwise the loop runs cycles
/// back to back. Pending events always apply before the next cycle.
async fn run_voice_loop(
    state: &Arc<SessionState>,
    processor: &Arc<TurnProcessor>,
    input: &InputController,
    presenter: &dyn ReplyPresenter,
    interlocutor_name: &str,
    capture_rx: &mut mpsc::UnboundedReceiver<()>,
) {
    while !state.exit_requested() {
        if input.keyboard_capture() {
            tokio::select! {
                () = state.wait_exit() => break,
                signal = capture_rx.recv() => {
                    if signal.is_none() {
                        break;
                    }
                }
            }
        }

        if state.exit_requested() {
            break;
        }

        if let Some((utterance, guard)) = input.capture_utterance().await {
            presenter.reply(interlocutor_name, &utterance);
            // Latch stays held until the turn settles.
            processor.process(utterance).await;
            drop(guard);
        }

        // Stale capture-start requests from mid-cycle key presses.
        while capture_rx.try_recv().is_ok() {}
    }
}
