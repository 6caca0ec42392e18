//! Transcript CSV log — `timestamp,actor,text` rows, audit only.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;

use avatar_core::ports::{StoreError, TranscriptRecord, TranscriptStore};

use crate::backstory::csv_to_store_error;
use crate::sanitize::sanitize;

/// Timestamp format for transcript rows.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// CSV-backed implementation of [`TranscriptStore`].
///
/// Serialization of concurrent appends is the caller's responsibility
/// (the session routes all writes through a single worker); this type
/// only guarantees that each row is written whole and flushed.
pub struct CsvTranscriptStore {
    path: PathBuf,
}

impl CsvTranscriptStore {
    /// Create a store over the given CSV path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The underlying log path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TranscriptStore for CsvTranscriptStore {
    async fn append(&self, actor: &str, text: &str) -> Result<(), StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .has_headers(false)
            .from_writer(file);

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        writer
            .write_record([timestamp, sanitize(actor), sanitize(text)])
            .map_err(csv_to_store_error)?;
        writer.flush()?;
        Ok(())
    }

    async fn replay(&self) -> Result<Vec<TranscriptRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&self.path)
            .map_err(csv_to_store_error)?;

        let mut records = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(csv_to_store_error)?;
            if record.len() < 3 {
                return Err(StoreError::MalformedRecord {
                    row,
                    message: "expected three columns: timestamp,actor,text".to_string(),
                });
            }
            records.push(TranscriptRecord {
                timestamp: record[0].to_string(),
                actor: record[1].to_string(),
                text: record[2].to_string(),
            });
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, CsvTranscriptStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvTranscriptStore::new(dir.path().join("transcript.csv"));
        (dir, store)
    }

    #[tokio::test]
    async fn replay_preserves_append_order() {
        let (_dir, store) = temp_store();
        store.append("You", "Hi").await.unwrap();
        store.append("Alex", "Hello there.").await.unwrap();
        store.append("You", "How are you?").await.unwrap();

        let records = store.replay().await.unwrap();
        let pairs: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.actor.as_str(), r.text.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("You", "Hi"), ("Alex", "Hello there."), ("You", "How are you?")]
        );
    }

    #[tokio::test]
    async fn timestamps_match_expected_format() {
        let (_dir, store) = temp_store();
        store.append("You", "Hi").await.unwrap();

        let records = store.replay().await.unwrap();
        assert!(
            chrono::NaiveDateTime::parse_from_str(&records[0].timestamp, TIMESTAMP_FORMAT).is_ok(),
            "unexpected timestamp: {}",
            records[0].timestamp
        );
    }

    #[tokio::test]
    async fn empty_store_replays_empty() {
        let (_dir, store) = temp_store();
        assert!(store.replay().await.unwrap().is_empty());
    }
}
