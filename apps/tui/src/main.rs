//! GameGuide TUI: chat with the strategy assistant in the terminal.
//!
//! A setup form collects the game name and optional reference URL, then a
//! chat screen shows the conversation, built with `ratatui` + `crossterm`.

mod app;
mod screens;
mod widgets;

use std::fs::File;
use std::sync::Mutex;

use color_eyre::eyre::{Result, WrapErr};
use gameguide_core::Assistant;
use gameguide_shared::{config_dir, load_config};

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    // Fail before touching the terminal when the key is missing.
    let config = load_config()?;
    let assistant = Assistant::from_config(&config)
        .wrap_err("cannot start the assistant")?;

    app::run(assistant)
}

/// Log to `~/.gameguide/tui.log`; stdout belongs to the terminal UI.
fn init_tracing() -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let dir = config_dir()?;
    std::fs::create_dir_all(&dir)?;
    let file = File::create(dir.join("tui.log"))?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gameguide=info"));

    fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
