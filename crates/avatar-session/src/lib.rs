//! Chat session controller — the conversational core.
//!
//! The session is a small set of cooperating tasks around one shared
//! [`SessionState`]:
//!
//! ```text
//!   key listener ──SessionEvent──▶ event pump ──▶ state flags
//!                                      │
//!                                      └─StartCapture─▶ session loop
//!   stdin lines ──────────────────────────────────────▶ session loop
//!                                                          │
//!                                   serial turn worker ◀───┘ (TEXT)
//!                                   inline processing  ◀───┘ (VOICE)
//! ```
//!
//! Two invariants carry the whole design: the `recording` latch admits at
//! most one voice capture cycle at a time, and all transcript appends go
//! through one writer so persisted order equals submission order.
//! Cancellation is cooperative — `exit_requested` stops new work; whatever
//! is in flight settles before the session reports its summary.

pub mod chat;
pub mod events;
pub mod input;
pub mod state;
pub mod text;
pub mod turn;

// Re-export key types for convenience
pub use chat::{ChatSessionController, SessionError, SessionSummary};
pub use events::SessionEvent;
pub use input::InputController;
pub use state::{CaptureGuard, InputMode, OutputMode, SessionState};
pub use turn::{ReplyPresenter, TurnProcessor};
