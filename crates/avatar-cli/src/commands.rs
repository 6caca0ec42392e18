//! Main commands enum and primary subcommands.

use clap::{Subcommand, ValueEnum};

use avatar_session::{InputMode, OutputMode};

/// Available commands for the avatar.
#[derive(Subcommand)]
pub enum Commands {
    /// Chat with the avatar
    Chat {
        /// How you talk to the avatar; prompted interactively when absent
        #[arg(long, value_enum)]
        input: Option<InputArg>,

        /// How the avatar replies; prompted interactively when absent
        #[arg(long, value_enum)]
        output: Option<OutputArg>,

        /// Spoken language for voice input (BCP-47 tag)
        #[arg(long)]
        language: Option<String>,
    },

    /// Interview yourself to author the avatar's backstory
    Story {
        /// Subject the interview questions should stick to
        #[arg(long, default_value = "your life so far")]
        subject: String,

        /// Stop after this many questions (unbounded when absent)
        #[arg(short = 'n', long)]
        questions: Option<u32>,
    },
}

/// User-facing input selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputArg {
    Text,
    Voice,
}

impl From<InputArg> for InputMode {
    fn from(arg: InputArg) -> Self {
        match arg {
            InputArg::Text => Self::Text,
            InputArg::Voice => Self::Voice,
        }
    }
}

/// User-facing output selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    Text,
    Speech,
}

impl From<OutputArg> for OutputMode {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Text => Self::Text,
            OutputArg::Speech => Self::Speech,
        }
    }
}
