//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface definition for the avatar.
///
/// This is the top-level parser that handles global options and
/// dispatches to subcommands. With no subcommand, an interactive menu is
/// shown instead.
#[derive(Parser)]
#[command(name = "avatar")]
#[command(about = "Converse with a persona built from an interviewed backstory")]
#[command(version)]
pub struct Cli {
    /// Path of the settings file
    #[arg(long = "config", global = true, default_value = "avatar.json")]
    pub config: PathBuf,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
