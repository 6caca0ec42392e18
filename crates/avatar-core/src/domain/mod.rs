//! Domain model — conversation turns, backstory, persona prompts.

pub mod backstory;
pub mod chat;
pub mod persona;

pub use backstory::{BLACKLIST_SENTINEL, Backstory, BackstoryEntry};
pub use chat::{Completion, Role, TokenUsage, Turn};
pub use persona::{chat_system_prompt, interview_system_prompt, interview_user_prompt};
