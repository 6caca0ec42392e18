//! CLI entry point - the composition root.
//!
//! Command dispatch routes to handlers which work through the composed
//! [`CliContext`]. With no subcommand, an interactive menu picks the
//! mode instead.

use clap::Parser;
use console::Term;
use tracing_subscriber::EnvFilter;

use avatar_cli::presentation::{MenuChoice, prompt_menu};
use avatar_cli::{Cli, Commands, bootstrap, handlers, load_settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging; stderr so status lines on stdout stay clean
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Bootstrap the CLI context (composition root)
    let settings = load_settings(&cli.config)?;
    let ctx = bootstrap(settings)?;

    match cli.command {
        Some(Commands::Chat { input, output, language }) => {
            handlers::chat::execute(&ctx, handlers::chat::ChatArgs { input, output, language })
                .await?;
        }
        Some(Commands::Story { subject, questions }) => {
            handlers::story::execute(&ctx, handlers::story::StoryArgs { subject, questions })
                .await?;
        }
        None => {
            let term = Term::stdout();
            match prompt_menu(&term)? {
                MenuChoice::AuthorStory => {
                    handlers::story::execute(
                        &ctx,
                        handlers::story::StoryArgs {
                            subject: "your life so far".to_string(),
                            questions: None,
                        },
                    )
                    .await?;
                }
                MenuChoice::Chat => {
                    handlers::chat::execute(&ctx, handlers::chat::ChatArgs::default()).await?;
                }
                MenuChoice::Quit => {}
            }
        }
    }

    Ok(())
}
