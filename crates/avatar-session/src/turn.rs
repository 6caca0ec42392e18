//! Turn processing — one utterance in, at most one reply out.

use std::sync::Arc;

use avatar_core::ports::{CompletionPort, SynthesisPort, TranscriptStore};

use crate::state::{OutputMode, SessionState};
use crate::text::normalize_reply;

/// Presentation boundary for user-visible output.
///
/// The session core never touches the terminal directly; the CLI
/// supplies an implementation with its styling, tests supply a recorder.
pub trait ReplyPresenter: Send + Sync {
    /// Show a finished utterance, attributed to its speaker.
    fn reply(&self, speaker: &str, text: &str);

    /// Show a transient status line (listening, service hiccups).
    fn status(&self, text: &str);
}

/// Advances session state and the backend gateway for one utterance.
///
/// Side effects only: appends to session state, persists to the
/// transcript store, emits output. A completion failure is recoverable —
/// it is surfaced and the turn simply produces no reply.
pub struct TurnProcessor {
    state: Arc<SessionState>,
    completion: Arc<dyn CompletionPort>,
    synthesis: Arc<dyn SynthesisPort>,
    transcript: Arc<dyn TranscriptStore>,
    presenter: Arc<dyn ReplyPresenter>,
    avatar_name: String,
    interlocutor_name: String,
}

impl TurnProcessor {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: Arc<SessionState>,
        completion: Arc<dyn CompletionPort>,
        synthesis: Arc<dyn SynthesisPort>,
        transcript: Arc<dyn TranscriptStore>,
        presenter: Arc<dyn ReplyPresenter>,
        avatar_name: impl Into<String>,
        interlocutor_name: impl Into<String>,
    ) -> Self {
        Self {
            state,
            completion,
            synthesis,
            transcript,
            presenter,
            avatar_name: avatar_name.into(),
            interlocutor_name: interlocutor_name.into(),
        }
    }

    /// Process one user utterance to completion.
    ///
    /// The caller owns turn ordering (serial worker in text mode, the
    /// `recording` latch in voice mode); this routine assumes it runs
    /// alone and appends in submission order.
    pub async fn process(&self, utterance: String) {
        self.state.push_user(utterance.clone());
        self.persist(&self.interlocutor_name, &utterance).await;

        // Full accumulated context every call; growth is accepted.
        let turns = self.state.snapshot();
        tracing::debug!(turns = turns.len(), "Requesting completion");

        match self.completion.complete(&turns).await {
            Ok(completion) => {
                self.state.add_usage(completion.usage);
                let reply = normalize_reply(&completion.text);
                self.state.push_assistant(reply.clone());
                self.persist(&self.avatar_name, &reply).await;
                self.emit(&reply).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Completion failed; no reply this turn");
                self.presenter
                    .status("The avatar could not be reached. Your message was kept; try again.");
            }
        }
    }

    async fn persist(&self, actor: &str, text: &str) {
        if let Err(e) = self.transcript.append(actor, text).await {
            // Durability for this turn is lost; the session carries on.
            tracing::warn!(error = %e, actor, "Transcript write failed");
        }
    }

    async fn emit(&self, reply: &str) {
        self.presenter.reply(&self.avatar_name, reply);
        if self.state.output_mode() == OutputMode::Speech {
            if let Err(e) = self.synthesis.speak(reply).await {
                // Degrade silently to the text already printed above.
                tracing::warn!(error = %e, "Synthesis failed; reply shown as text only");
            }
        }
    }
}
