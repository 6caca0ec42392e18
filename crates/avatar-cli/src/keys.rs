//! Raw-mode key listener for voice sessions.
//!
//! A dedicated thread polls crossterm events and publishes typed
//! [`SessionEvent`]s; it never mutates session state directly. Bindings:
//!
//! - `Esc` / `Ctrl-C` — request exit
//! - `Space`          — start a capture cycle (keyboard capture only)
//! - `1`..`9`         — switch to the n-th configured language
//!
//! Raw mode is enabled for the listener's lifetime and always restored,
//! including on drop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tokio::sync::mpsc;

use avatar_session::SessionEvent;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to the background key listener.
pub struct KeyListener {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl KeyListener {
    /// Enable raw mode and start publishing key events.
    pub fn spawn(
        events: mpsc::UnboundedSender<SessionEvent>,
        languages: Vec<String>,
        keyboard_capture: bool,
    ) -> Result<Self> {
        terminal::enable_raw_mode().context("Failed to enable raw terminal mode")?;

        let stop = Arc::new(AtomicBool::new(false));
        let handle = {
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || listen(&events, &languages, keyboard_capture, &stop))
        };

        Ok(Self { stop, handle: Some(handle) })
    }

    /// Stop the listener and restore the terminal.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        let _ = terminal::disable_raw_mode();
    }
}

impl Drop for KeyListener {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn listen(
    events: &mpsc::UnboundedSender<SessionEvent>,
    languages: &[String],
    keyboard_capture: bool,
    stop: &AtomicBool,
) {
    while !stop.load(Ordering::SeqCst) {
        if !event::poll(POLL_INTERVAL).unwrap_or(false) {
            continue;
        }
        let Ok(Event::Key(key)) = event::read() else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let event = match key.code {
            KeyCode::Esc => Some(SessionEvent::RequestExit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(SessionEvent::RequestExit)
            }
            KeyCode::Char(' ') if keyboard_capture => Some(SessionEvent::StartCapture),
            KeyCode::Char(digit @ '1'..='9') => {
                let index = digit as usize - '1' as usize;
                languages.get(index).map(|tag| SessionEvent::SwitchLanguage(tag.clone()))
            }
            _ => None,
        };

        let Some(event) = event else { continue };
        let is_exit = matches!(event, SessionEvent::RequestExit);
        if events.send(event).is_err() || is_exit {
            // Receiver gone or session ending; nothing left to listen for.
            break;
        }
    }
}
