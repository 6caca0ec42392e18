//! Terminal front end for the avatar.
//!
//! This crate is the outermost adapter: argument parsing, the bootstrap
//! composition root, terminal presentation, the raw-mode key listener,
//! and the command handlers. All conversational behavior lives in
//! `avatar-session`; nothing here touches the network or audio devices
//! except through the ports composed in [`bootstrap`].

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod keys;
pub mod parser;
pub mod presentation;

pub use bootstrap::{CliContext, bootstrap, load_settings};
pub use commands::{Commands, InputArg, OutputArg};
pub use parser::Cli;
