//! Terminal presentation.
//!
//! Styled output and cooked-mode line input via `console`. Transient
//! status lines ("(listening en-US)") are written without a newline and
//! cleared with a carriage return before the next durable line, so the
//! conversation itself stays clean.

use std::io::Write;

use console::{Term, style};
use tokio::sync::mpsc;

use avatar_session::ReplyPresenter;

/// Presenter writing to the process terminal.
pub struct TerminalPresenter {
    term: Term,
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self { term: Term::stdout() }
    }
}

impl ReplyPresenter for TerminalPresenter {
    fn reply(&self, speaker: &str, text: &str) {
        let _ = self.term.clear_line();
        let mut out = &self.term;
        let _ = write!(out, "{}", reply_line(speaker, text));
        let _ = out.flush();
    }

    fn status(&self, text: &str) {
        // Overwrites the previous status in place.
        let _ = self.term.clear_line();
        let mut out = &self.term;
        let _ = write!(out, "\r{}", style(text).dim());
        let _ = out.flush();
    }
}

/// One durable conversation line, with explicit CRLF.
///
/// The key listener keeps the terminal in raw mode for the whole voice
/// session, where a bare `\n` advances without returning the carriage;
/// `\r\n` renders correctly in both raw and cooked mode.
fn reply_line(speaker: &str, text: &str) -> String {
    format!("\r{} {text}\r\n", style(format!("{speaker}:")).cyan().bold())
}

/// Top-level menu choice when no subcommand was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AuthorStory,
    Chat,
    Quit,
}

/// Show the numbered menu and read a choice.
pub fn prompt_menu(term: &Term) -> std::io::Result<MenuChoice> {
    term.write_line("")?;
    term.write_line(&format!("  {}", style("What would you like to do?").cyan().bold()))?;
    term.write_line("    1. Author the avatar's backstory")?;
    term.write_line("    2. Chat with the avatar")?;
    term.write_line("    q. Quit")?;

    loop {
        let line = prompt_line(term, "> ")?;
        match line.trim() {
            "1" => return Ok(MenuChoice::AuthorStory),
            "2" => return Ok(MenuChoice::Chat),
            "q" | "Q" | "quit" | "exit" => return Ok(MenuChoice::Quit),
            _ => term.write_line("  Please answer 1, 2 or q.")?,
        }
    }
}

/// Ask a one-of-N question until one of `options` is chosen; entering
/// nothing picks the first option.
pub fn prompt_choice(term: &Term, question: &str, options: &[&str]) -> std::io::Result<String> {
    term.write_line(&format!(
        "  {} [{}]",
        style(question).cyan(),
        options.join("/")
    ))?;
    loop {
        let line = prompt_line(term, "> ")?;
        let answer = line.trim().to_lowercase();
        if answer.is_empty() {
            return Ok(options[0].to_string());
        }
        if options.contains(&answer.as_str()) {
            return Ok(answer);
        }
        term.write_line(&format!("  Please answer one of: {}", options.join(", ")))?;
    }
}

/// Print a styled prompt and read one line.
pub fn prompt_line(term: &Term, prompt: &str) -> std::io::Result<String> {
    let mut out = term;
    write!(out, "{}", style(prompt).cyan().bold())?;
    out.flush()?;
    term.read_line()
}

/// Feed terminal lines to the session from a dedicated thread.
///
/// The channel closes when the terminal reaches end of input or the
/// session side drops the receiver; either ends the loop.
pub fn spawn_line_reader(prompt: String) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let term = Term::stdout();
        loop {
            match prompt_line(&term, &prompt) {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_line_returns_carriage_before_and_after() {
        let line = reply_line("Alex", "Hello there.");
        assert!(line.starts_with('\r'));
        assert!(line.ends_with("\r\n"));
        assert!(line.contains("Alex:"));
        assert!(line.contains("Hello there."));
    }
}
