//! CSV-backed persistence for the avatar chat system.
//!
//! Two append-only logs implement the `avatar-core` persistence ports:
//!
//! - the **backstory log** (`question,answer` rows, with a sentinel
//!   answer marking blacklisted questions), and
//! - the **transcript log** (`timestamp,actor,text` rows, audit only).
//!
//! Rows are fully quoted on write and all strings are sanitized first so
//! embedded newlines or tabs cannot corrupt the log.

pub mod backstory;
pub mod sanitize;
pub mod transcript;

pub use backstory::CsvBackstoryStore;
pub use sanitize::sanitize;
pub use transcript::CsvTranscriptStore;
