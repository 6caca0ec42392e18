//! Chat command handler.
//!
//! Resolves the session modes (flags first, interactive prompts for
//! whatever is missing), composes the session from the context's ports,
//! runs it to completion, then prints the token totals and, when prices
//! are configured, the estimated cost.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use console::{Term, style};
use tokio::sync::mpsc;

use avatar_backend::MicrophoneCapture;
use avatar_core::domain::{Backstory, chat_system_prompt};
use avatar_session::{
    ChatSessionController, InputController, InputMode, OutputMode, ReplyPresenter, SessionState,
    TurnProcessor,
};

use crate::bootstrap::CliContext;
use crate::commands::{InputArg, OutputArg};
use crate::keys::KeyListener;
use crate::presentation::{TerminalPresenter, prompt_choice, spawn_line_reader};

/// Arguments for the chat command.
#[derive(Debug, Clone, Default)]
pub struct ChatArgs {
    pub input: Option<InputArg>,
    pub output: Option<OutputArg>,
    pub language: Option<String>,
}

/// Execute the chat command.
pub async fn execute(ctx: &CliContext, args: ChatArgs) -> Result<()> {
    let term = Term::stdout();
    let settings = &ctx.settings;

    let input_mode = resolve_input(&term, args.input)?;
    let output_mode = resolve_output(&term, args.output)?;

    if input_mode == InputMode::Voice {
        // The one fatal audio check; everything later degrades instead.
        MicrophoneCapture::probe().context("No usable audio input device")?;
    }

    let language = match args.language {
        Some(tag) => {
            if !settings.languages.iter().any(|l| l == &tag) {
                tracing::warn!(language = %tag, "Language not in the configured list; key switching covers configured languages only");
            }
            tag
        }
        None => settings.default_language().to_string(),
    };

    let entries = ctx.backstory.load().await.context("Failed to load the backstory")?;
    let backstory = Backstory::from_entries(entries);
    if backstory.answers().is_empty() {
        term.write_line(&format!(
            "  {}",
            style("The backstory is empty; run `avatar story` first for a richer persona.").dim()
        ))?;
    }

    let state = SessionState::new(input_mode, output_mode, language, chat_system_prompt(&backstory));
    let presenter: Arc<dyn ReplyPresenter> = Arc::new(TerminalPresenter::new());
    let processor = Arc::new(TurnProcessor::new(
        Arc::clone(&state),
        Arc::clone(&ctx.completion),
        Arc::clone(&ctx.synthesis),
        Arc::clone(&ctx.transcript),
        Arc::clone(&presenter),
        settings.avatar_name.clone(),
        settings.interlocutor_name.clone(),
    ));

    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let (input, lines, keys) = match input_mode {
        InputMode::Text => {
            term.write_line(&format!(
                "  {}",
                style("Type your message; `exit` or `quit` ends the session.").dim()
            ))?;
            let prompt = format!("{}: ", settings.interlocutor_name);
            (None, Some(spawn_line_reader(prompt)), None)
        }
        InputMode::Voice => {
            print_voice_help(&term, settings.keyboard_capture, &settings.languages)?;
            let input = InputController::new(
                Arc::clone(&state),
                Arc::clone(&ctx.capture),
                Arc::clone(&ctx.transcription),
                Arc::clone(&presenter),
                Duration::from_secs(settings.speech_timeout_secs),
                settings.keyboard_capture,
            );
            let keys = KeyListener::spawn(
                event_tx.clone(),
                settings.languages.clone(),
                settings.keyboard_capture,
            )?;
            (Some(input), None, Some(keys))
        }
    };

    let controller = ChatSessionController::new(
        Arc::clone(&state),
        processor,
        input,
        Arc::clone(&presenter),
        event_rx,
        lines,
        settings.interlocutor_name.clone(),
    );

    let summary = controller.run().await?;
    if let Some(keys) = keys {
        keys.stop();
    }

    term.write_line("")?;
    term.write_line(&format!(
        "  Tokens used: {} prompt + {} completion = {}",
        summary.usage.prompt_tokens,
        summary.usage.completion_tokens,
        summary.usage.total(),
    ))?;
    if let Some(cost) =
        settings.estimated_cost(summary.usage.prompt_tokens, summary.usage.completion_tokens)
    {
        term.write_line(&format!("  Estimated cost: ${cost:.4}"))?;
    }

    Ok(())
}

fn resolve_input(term: &Term, arg: Option<InputArg>) -> Result<InputMode> {
    if let Some(arg) = arg {
        return Ok(arg.into());
    }
    let answer = prompt_choice(term, "Talk by text or voice?", &["text", "voice"])?;
    Ok(match answer.as_str() {
        "voice" => InputMode::Voice,
        _ => InputMode::Text,
    })
}

fn resolve_output(term: &Term, arg: Option<OutputArg>) -> Result<OutputMode> {
    if let Some(arg) = arg {
        return Ok(arg.into());
    }
    let answer = prompt_choice(term, "Replies as text or speech?", &["text", "speech"])?;
    Ok(match answer.as_str() {
        "speech" => OutputMode::Speech,
        _ => OutputMode::Text,
    })
}

fn print_voice_help(term: &Term, keyboard_capture: bool, languages: &[String]) -> Result<()> {
    term.write_line(&format!("  {}", style("Esc ends the session.").dim()))?;
    if keyboard_capture {
        term.write_line(&format!("  {}", style("Space starts a capture.").dim()))?;
    }
    if languages.len() > 1 {
        let bindings: Vec<String> = languages
            .iter()
            .take(9)
            .enumerate()
            .map(|(i, tag)| format!("{} = {tag}", i + 1))
            .collect();
        term.write_line(&format!("  {}", style(bindings.join(", ")).dim()))?;
    }
    Ok(())
}
