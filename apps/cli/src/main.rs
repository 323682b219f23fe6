//! GameGuide CLI: ask Gemini about a video game from the terminal.
//!
//! Runs a line-oriented chat session, one-shot questions, the standalone
//! page scraper, and config management.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
