//! Input controller — voice capture cycles.
//!
//! One call to [`InputController::capture_utterance`] is one attempt to
//! produce a user utterance. The cycle is guarded by the session's
//! `recording` latch, performs a single bounded-duration listen, and on
//! captured audio invokes transcription. Timeouts re-listen automatically
//! (an explicit loop, bounded only by `exit_requested`) unless keyboard
//! capture is configured, in which case the cycle ends and the next key
//! press starts a new one.

use std::sync::Arc;
use std::time::Duration;

use avatar_core::ports::{CapturePort, GatewayError, TranscriptionPort};

use crate::state::{CaptureGuard, SessionState};
use crate::turn::ReplyPresenter;

/// Bounded number of consecutive speech-service failures before the
/// cycle gives up and ends without an utterance.
const MAX_SERVICE_RETRIES: u32 = 3;

/// Produces user utterances from the microphone.
pub struct InputController {
    state: Arc<SessionState>,
    capture: Arc<dyn CapturePort>,
    transcription: Arc<dyn TranscriptionPort>,
    presenter: Arc<dyn ReplyPresenter>,
    listen_timeout: Duration,
    keyboard_capture: bool,
    service_retry_delay: Duration,
}

impl InputController {
    #[must_use]
    pub fn new(
        state: Arc<SessionState>,
        capture: Arc<dyn CapturePort>,
        transcription: Arc<dyn TranscriptionPort>,
        presenter: Arc<dyn ReplyPresenter>,
        listen_timeout: Duration,
        keyboard_capture: bool,
    ) -> Self {
        Self {
            state,
            capture,
            transcription,
            presenter,
            listen_timeout,
            keyboard_capture,
            service_retry_delay: Duration::from_secs(2),
        }
    }

    /// Whether capture cycles are started by key press rather than
    /// automatically re-listening after a timeout.
    #[must_use]
    pub const fn keyboard_capture(&self) -> bool {
        self.keyboard_capture
    }

    /// Shorten the pause after a speech-service failure. Test hook.
    pub fn set_service_retry_delay(&mut self, delay: Duration) {
        self.service_retry_delay = delay;
    }

    /// Run one capture cycle.
    ///
    /// Returns the transcribed utterance together with the still-held
    /// capture guard: the latch stays down while the resulting turn is
    /// processed and is released when the guard drops. `None` means no
    /// utterance this cycle (timeout under keyboard capture, empty
    /// transcript, exit requested, or a latch already held elsewhere).
    pub async fn capture_utterance(&self) -> Option<(String, CaptureGuard)> {
        let mut service_failures = 0u32;

        loop {
            if self.state.exit_requested() {
                return None;
            }

            // A concurrent holder means a cycle is already running.
            let guard = self.state.begin_capture()?;
            let language = self.state.language();

            self.presenter.status(&format!("(listening {language})"));
            match self.capture.listen(self.listen_timeout).await {
                Ok(Some(clip)) => {
                    self.presenter.status(&format!("(transcribing {language})"));
                    match self.transcription.transcribe(clip, &language).await {
                        Ok(Some(text)) => return Some((text, guard)),
                        Ok(None) => {
                            drop(guard);
                            self.presenter.status("Can't understand audio. Please try again.");
                            return None;
                        }
                        Err(e) => {
                            drop(guard);
                            tracing::warn!(error = %e, "Transcription failed");
                            self.presenter
                                .status("Speech service unreachable. Please try again.");
                            service_failures += 1;
                            if service_failures >= MAX_SERVICE_RETRIES || self.keyboard_capture {
                                return None;
                            }
                            tokio::time::sleep(self.service_retry_delay).await;
                        }
                    }
                }
                Ok(None) => {
                    // Listen window elapsed with no speech.
                    drop(guard);
                    if self.keyboard_capture {
                        self.presenter.status("Can't hear you. Please try again.");
                        return None;
                    }
                    // Auto mode: re-listen; exit is rechecked at loop top.
                }
                Err(GatewayError::NoInputDevice) => {
                    drop(guard);
                    tracing::error!("Input device lost mid-session");
                    self.presenter.status("Microphone unavailable.");
                    return None;
                }
                Err(e) => {
                    drop(guard);
                    tracing::warn!(error = %e, "Capture failed");
                    self.presenter.status("Microphone trouble. Please try again.");
                    service_failures += 1;
                    if service_failures >= MAX_SERVICE_RETRIES || self.keyboard_capture {
                        return None;
                    }
                    tokio::time::sleep(self.service_retry_delay).await;
                }
            }
        }
    }
}
