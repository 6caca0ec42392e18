//! Backstory authoring handler.
//!
//! Sequential interview loop: the model asks one question at a time, the
//! human answers, and each pair is appended to the backstory log. A
//! blank answer (or "pass"/"skip") blacklists the question so it is
//! never asked again; "quit"/"exit" ends the interview.

use anyhow::{Context, Result};
use console::{Term, style};

use avatar_core::domain::{
    BLACKLIST_SENTINEL, Backstory, BackstoryEntry, Turn, interview_system_prompt,
    interview_user_prompt,
};

use crate::bootstrap::CliContext;
use crate::presentation::prompt_line;

/// Question used to seed the avatar's own name into a fresh backstory.
const NAME_QUESTION: &str = "What's your name?";

/// Arguments for the story command.
#[derive(Debug, Clone)]
pub struct StoryArgs {
    pub subject: String,
    pub questions: Option<u32>,
}

/// Execute the story command.
pub async fn execute(ctx: &CliContext, args: StoryArgs) -> Result<()> {
    let term = Term::stdout();

    let mut entries = ctx.backstory.load().await.context("Failed to load the backstory")?;
    let mut backstory = Backstory::from_entries(entries.clone());

    // A fresh backstory at least knows the avatar's name.
    if !backstory.knows_question(NAME_QUESTION) {
        let answer = format!("My name is {}.", ctx.settings.avatar_name);
        ctx.backstory
            .append(NAME_QUESTION, &answer)
            .await
            .context("Failed to write the backstory")?;
        entries.push(BackstoryEntry { question: NAME_QUESTION.to_string(), answer });
        backstory = Backstory::from_entries(entries.clone());
    }

    term.write_line("")?;
    term.write_line(&format!(
        "  {}",
        style(format!("Interview subject: {}", args.subject)).cyan()
    ))?;
    term.write_line(&format!(
        "  {}",
        style("Answer each question; blank or `pass` skips it forever, `quit` ends.").dim()
    ))?;
    term.write_line("")?;

    let mut asked = 0u32;
    loop {
        if let Some(limit) = args.questions {
            if asked >= limit {
                break;
            }
        }

        let turns = [
            Turn::system(interview_system_prompt(&backstory, &args.subject)),
            Turn::user(interview_user_prompt()),
        ];
        let question = match ctx.completion.complete(&turns).await {
            Ok(completion) => completion.text.trim().to_string(),
            Err(e) => {
                tracing::error!(error = %e, "Interview question request failed");
                term.write_line(&format!(
                    "  {}",
                    style("The interviewer could not be reached; stopping here.").dim()
                ))?;
                break;
            }
        };
        if question.is_empty() {
            tracing::warn!("Interviewer returned an empty question; stopping");
            break;
        }
        asked += 1;

        term.write_line(&format!("{} {question}", style("Q:").cyan().bold()))?;
        let answer = prompt_line(&term, "A: ")?;
        let trimmed = answer.trim();

        let recorded = match trimmed.to_lowercase().as_str() {
            "quit" | "exit" => break,
            "" | "pass" | "skip" => BLACKLIST_SENTINEL.to_string(),
            _ => trimmed.to_string(),
        };
        ctx.backstory
            .append(&question, &recorded)
            .await
            .context("Failed to write the backstory")?;
        entries.push(BackstoryEntry { question, answer: recorded });
        backstory = Backstory::from_entries(entries.clone());
    }

    term.write_line("")?;
    term.write_line(&format!(
        "  Backstory now holds {} entries ({} answered).",
        backstory.len(),
        backstory.answered().count(),
    ))?;
    Ok(())
}
