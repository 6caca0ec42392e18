//! Persona prompt builders.
//!
//! The system prompts sent to the completion backend are assembled here
//! from the backstory, so the session and authoring layers share one
//! source of truth for prompt wording.

use super::backstory::Backstory;

/// Build the system turn text for a chat session.
///
/// The persona is instructed to answer from its backstory and to
/// improvise consistently when the backstory is silent.
#[must_use]
pub fn chat_system_prompt(backstory: &Backstory) -> String {
    format!(
        "You are having a friendly conversation with your interlocutor. \
         You both want to know more about each other. \
         [Directives: \
         - Here is some information about you that you can use to answer \
         your interlocutor's questions: {:?}. \
         - Be friendly, keep the conversation going by answering as best as you can. \
         - If you don't know an answer, just make one up that fits your backstory.]",
        backstory.answers()
    )
}

/// Build the system turn text for one interview round in authoring mode.
///
/// Known answers and blacklisted questions are inlined so the model does
/// not repeat itself.
#[must_use]
pub fn interview_system_prompt(backstory: &Backstory, subject: &str) -> String {
    format!(
        "You are writing the autobiography of your interlocutor and you need \
         to know everything about him. \
         [Directives: \
         - Limit your questions to the following subject: {subject}. \
         - Here is some information you already know about him: {:?}. \
         - Don't ask a question if you already know the answer. \
         - Don't ask questions from this black list: {:?}. \
         - Limit your answers to one single question. \
         - Be direct but friendly.]",
        backstory.answers(),
        backstory.blacklist()
    )
}

/// The fixed user turn that prompts the model for its next interview
/// question.
#[must_use]
pub const fn interview_user_prompt() -> &'static str {
    "Ask me something you don't know about me?"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backstory::{BLACKLIST_SENTINEL, BackstoryEntry};

    fn story() -> Backstory {
        Backstory::from_entries(vec![
            BackstoryEntry {
                question: "What's your name?".into(),
                answer: "My name is Alex.".into(),
            },
            BackstoryEntry {
                question: "How much do you earn?".into(),
                answer: BLACKLIST_SENTINEL.into(),
            },
        ])
    }

    #[test]
    fn chat_prompt_carries_answers_only() {
        let prompt = chat_system_prompt(&story());
        assert!(prompt.contains("My name is Alex."));
        assert!(!prompt.contains("How much do you earn?"));
    }

    #[test]
    fn interview_prompt_carries_subject_and_blacklist() {
        let prompt = interview_system_prompt(&story(), "childhood memories");
        assert!(prompt.contains("childhood memories"));
        assert!(prompt.contains("How much do you earn?"));
    }
}
