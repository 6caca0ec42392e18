//! Backstory CSV log — `question,answer` rows, append-only.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use avatar_core::domain::BackstoryEntry;
use avatar_core::ports::{BackstoryRepository, StoreError};

use crate::sanitize::sanitize;

/// CSV-backed implementation of [`BackstoryRepository`].
pub struct CsvBackstoryStore {
    path: PathBuf,
}

impl CsvBackstoryStore {
    /// Create a store over the given CSV path. The file is created lazily
    /// on first append; a missing file loads as an empty backstory.
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
impl BackstoryRepository for CsvBackstoryStore {
    async fn load(&self) -> Result<Vec<BackstoryEntry>, StoreError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No backstory log yet");
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&self.path)
            .map_err(csv_to_store_error)?;

        let mut entries = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(csv_to_store_error)?;
            let question = record.get(0).unwrap_or_default();
            let answer = record.get(1).ok_or_else(|| StoreError::MalformedRecord {
                row,
                message: "expected two columns: question,answer".to_string(),
            })?;
            entries.push(BackstoryEntry {
                question: question.to_string(),
                answer: answer.to_string(),
            });
        }

        tracing::debug!(count = entries.len(), path = %self.path.display(), "Backstory loaded");
        Ok(entries)
    }

    async fn append(&self, question: &str, answer: &str) -> Result<(), StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .has_headers(false)
            .from_writer(file);

        writer
            .write_record([sanitize(question), sanitize(answer)])
            .map_err(csv_to_store_error)?;
        writer.flush()?;
        Ok(())
    }
}

/// Map a csv error into a store error, keeping IO errors distinct.
pub(crate) fn csv_to_store_error(err: csv::Error) -> StoreError {
    if err.is_io_error() {
        match err.into_kind() {
            csv::ErrorKind::Io(io) => StoreError::Io(io),
            other => StoreError::MalformedRecord { row: 0, message: format!("{other:?}") },
        }
    } else {
        StoreError::MalformedRecord { row: 0, message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_core::domain::{BLACKLIST_SENTINEL, Backstory};

    fn temp_store() -> (tempfile::TempDir, CsvBackstoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvBackstoryStore::new(dir.path().join("answers.csv"));
        (dir, store)
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let (_dir, store) = temp_store();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_then_load_round_trips() {
        let (_dir, store) = temp_store();
        store.append("Where do you live?", "In a lighthouse.").await.unwrap();
        store.append("Shoe size?", BLACKLIST_SENTINEL).await.unwrap();

        let entries = store.load().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].question, "Where do you live?");
        assert_eq!(entries[0].answer, "In a lighthouse.");
        assert!(entries[1].is_blacklisted());

        let story = Backstory::from_entries(entries);
        assert_eq!(story.answers(), vec!["In a lighthouse."]);
        assert_eq!(story.blacklist(), vec!["Shoe size?"]);
    }

    #[tokio::test]
    async fn appended_strings_are_sanitized() {
        let (_dir, store) = temp_store();
        store.append("Multi\nline\tquestion?", "  padded   answer ").await.unwrap();

        let entries = store.load().await.unwrap();
        assert_eq!(entries[0].question, "Multi line question?");
        assert_eq!(entries[0].answer, "padded answer");
    }

    #[tokio::test]
    async fn commas_and_quotes_survive_quoting() {
        let (_dir, store) = temp_store();
        store.append("Likes?", r#"Cheese, wine, and "slow" mornings"#).await.unwrap();

        let entries = store.load().await.unwrap();
        assert_eq!(entries[0].answer, r#"Cheese, wine, and "slow" mornings"#);
    }
}
