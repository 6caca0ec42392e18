//! Backstory domain types.
//!
//! The backstory is the persisted set of question/answer pairs that
//! establishes the avatar persona. It is gathered in the authoring mode
//! and read-only during chat.

use serde::{Deserialize, Serialize};

/// Sentinel answer value marking a question as permanently excluded from
/// future interview prompts.
pub const BLACKLIST_SENTINEL: &str = "BLACKLIST";

/// One persisted question/answer pair. Unique by question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackstoryEntry {
    pub question: String,
    pub answer: String,
}

impl BackstoryEntry {
    /// Whether this entry blacklists its question rather than answering it.
    #[must_use]
    pub fn is_blacklisted(&self) -> bool {
        self.answer == BLACKLIST_SENTINEL
    }
}

/// The avatar's backstory, loaded once at startup.
///
/// Entries are partitioned into answered questions and a blacklist of
/// questions the interviewee declined. Later duplicates of a question
/// replace earlier ones, so the log can amend answers append-only.
#[derive(Debug, Clone, Default)]
pub struct Backstory {
    entries: Vec<BackstoryEntry>,
}

impl Backstory {
    /// Build a backstory from raw log entries, deduplicating by question
    /// (last write wins).
    #[must_use]
    pub fn from_entries(raw: Vec<BackstoryEntry>) -> Self {
        let mut entries: Vec<BackstoryEntry> = Vec::with_capacity(raw.len());
        for entry in raw {
            if let Some(existing) = entries.iter_mut().find(|e| e.question == entry.question) {
                existing.answer = entry.answer;
            } else {
                entries.push(entry);
            }
        }
        Self { entries }
    }

    /// All answered (non-blacklisted) entries, in log order.
    pub fn answered(&self) -> impl Iterator<Item = &BackstoryEntry> {
        self.entries.iter().filter(|e| !e.is_blacklisted())
    }

    /// The answers the persona can draw on, in log order.
    #[must_use]
    pub fn answers(&self) -> Vec<&str> {
        self.answered().map(|e| e.answer.as_str()).collect()
    }

    /// Questions permanently excluded from the interview.
    #[must_use]
    pub fn blacklist(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.is_blacklisted())
            .map(|e| e.question.as_str())
            .collect()
    }

    /// Whether a question has already been asked (answered or blacklisted).
    #[must_use]
    pub fn knows_question(&self, question: &str) -> bool {
        self.entries.iter().any(|e| e.question == question)
    }

    /// Total number of distinct questions in the log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the backstory holds no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(q: &str, a: &str) -> BackstoryEntry {
        BackstoryEntry { question: q.into(), answer: a.into() }
    }

    #[test]
    fn partitions_answers_and_blacklist() {
        let story = Backstory::from_entries(vec![
            entry("Where were you born?", "In Lyon."),
            entry("What is your shoe size?", BLACKLIST_SENTINEL),
            entry("What do you do?", "I restore old pianos."),
        ]);

        assert_eq!(story.answers(), vec!["In Lyon.", "I restore old pianos."]);
        assert_eq!(story.blacklist(), vec!["What is your shoe size?"]);
        assert_eq!(story.len(), 3);
    }

    #[test]
    fn later_duplicate_question_wins() {
        let story = Backstory::from_entries(vec![
            entry("Favourite colour?", "Blue."),
            entry("Favourite colour?", "Green, actually."),
        ]);

        assert_eq!(story.len(), 1);
        assert_eq!(story.answers(), vec!["Green, actually."]);
    }

    #[test]
    fn knows_question_covers_blacklisted_entries() {
        let story = Backstory::from_entries(vec![entry("Age?", BLACKLIST_SENTINEL)]);
        assert!(story.knows_question("Age?"));
        assert!(!story.knows_question("Name?"));
    }
}
