//! Persistence ports — backstory log and transcript store.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::BackstoryEntry;

/// Errors that can occur in persistence operations.
///
/// Store failures are logged and never abort the in-memory session;
/// losing durability for one turn is an accepted risk.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record at row {row}: {message}")]
    MalformedRecord { row: usize, message: String },
}

/// One persisted transcript record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRecord {
    /// Timestamp string, `%Y-%m-%d %H:%M:%S` local time.
    pub timestamp: String,
    /// Display name of the speaker.
    pub actor: String,
    pub text: String,
}

/// Port for the backstory question/answer log.
#[async_trait]
pub trait BackstoryRepository: Send + Sync {
    /// Load all recorded entries in log order.
    async fn load(&self) -> Result<Vec<BackstoryEntry>, StoreError>;

    /// Append one question/answer pair.
    async fn append(&self, question: &str, answer: &str) -> Result<(), StoreError>;
}

/// Port for the append-only chat transcript.
///
/// Records are created incrementally and never mutated or deleted. The
/// store is read back only at startup (context seeding) and for audit.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Append one record, timestamped at write time.
    async fn append(&self, actor: &str, text: &str) -> Result<(), StoreError>;

    /// Replay all records in persisted order.
    async fn replay(&self) -> Result<Vec<TranscriptRecord>, StoreError>;
}
