//! CLI command definitions, routing, and tracing setup.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use gameguide_core::{ANSWER_FAILED, Assistant, GeminiClient, GeminiSettings, Session};
use gameguide_crawler::{PageFetcher, extract};
use gameguide_shared::{AppConfig, ExtractedPage, init_config, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// GameGuide: a Gemini-powered video game strategy assistant.
#[derive(Parser)]
#[command(
    name = "gameguide",
    version,
    about = "Ask Gemini about a video game, optionally anchored to a reference page.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.gameguide/gameguide.toml.
    #[arg(long, global = true, env = "GAMEGUIDE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Start an interactive chat session.
    Chat {
        /// Game to ask about (prompted for when omitted).
        #[arg(short, long)]
        game: Option<String>,

        /// Reference page the answers should prefer.
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Ask a single question and print the answer.
    Ask {
        /// Game to ask about.
        #[arg(short, long)]
        game: String,

        /// Reference page the answer should prefer.
        #[arg(short, long)]
        url: Option<String>,

        /// The question.
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },

    /// Fetch a page and print its extracted title, text, and links.
    Scrape {
        /// Page URL.
        url: String,

        /// Print the extracted page as JSON.
        #[arg(long)]
        json: bool,

        /// Number of body-text characters to show.
        #[arg(long, default_value = "500")]
        excerpt: usize,

        /// Number of links to show.
        #[arg(long, default_value = "5")]
        links: usize,
    },

    /// List Gemini models that support generateContent.
    Models,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so answers on
/// stdout stay clean.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "gameguide=warn",
        1 => "gameguide=info",
        2 => "gameguide=debug",
        _ => "gameguide=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Chat { game, url } => {
            cmd_chat(config_path, game.as_deref(), url.as_deref()).await
        }
        Command::Ask {
            game,
            url,
            question,
        } => cmd_ask(config_path, &game, url.as_deref(), &question.join(" ")).await,
        Command::Scrape {
            url,
            json,
            excerpt,
            links,
        } => cmd_scrape(&url, json, excerpt, links).await,
        Command::Models => cmd_models(config_path).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(config_path).await,
        },
    }
}

fn resolve_config(path: Option<PathBuf>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(&p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// chat
// ---------------------------------------------------------------------------

/// A line typed during the chat phase.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput {
    Question(String),
    Reset,
    Quit,
    Empty,
}

impl ChatInput {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Self::Empty,
            "/reset" => Self::Reset,
            "/quit" | "/exit" => Self::Quit,
            // Questions are sent exactly as typed, minus the line ending.
            _ => Self::Question(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

async fn cmd_chat(config_path: Option<PathBuf>, game: Option<&str>, url: Option<&str>) -> Result<()> {
    let config = resolve_config(config_path)?;
    // Built once, reused for every question in this process.
    let assistant = Assistant::from_config(&config)?;

    let stdin = std::io::stdin();
    let session = chat_loop(&assistant, &mut stdin.lock(), game, url).await?;

    info!(turns = session.turns().len(), "chat ended");
    Ok(())
}

/// Setup prompts, then questions, until `/quit` or end of input.
///
/// `/reset` clears the session and goes back to the setup prompts. The
/// preset game and URL only apply to the first session.
async fn chat_loop(
    assistant: &Assistant,
    input: &mut impl BufRead,
    game: Option<&str>,
    url: Option<&str>,
) -> Result<Session> {
    let mut session = Session::new();
    let mut preset_game = game.map(str::to_string);
    let mut preset_url = url.map(str::to_string);

    'sessions: loop {
        // --- Setup phase ---
        let game_name = loop {
            let game_name = match preset_game.take() {
                Some(name) => name,
                None => match prompt(input, "Game you want help with (required): ")? {
                    Some(name) => name,
                    None => break 'sessions,
                },
            };
            if !game_name.trim().is_empty() {
                break game_name;
            }
            eprintln!("  ! enter a game name");
        };

        let reference_url = match preset_url.take() {
            Some(url) => Some(url),
            None => prompt(input, "Reference guide URL (optional, Enter to skip): ")?,
        };

        session.start(game_name.trim(), reference_url.as_deref())?;

        print_header(&session);
        for turn in session.turns() {
            println!("assistant> {}\n", turn.content);
        }

        // --- Chat phase ---
        loop {
            let Some(line) = prompt(input, "you> ")? else {
                break 'sessions;
            };

            match ChatInput::parse(&line) {
                ChatInput::Empty => continue,
                ChatInput::Quit => break 'sessions,
                ChatInput::Reset => {
                    session.reset();
                    println!("\nSession reset.\n");
                    continue 'sessions;
                }
                ChatInput::Question(question) => {
                    let spinner = Spinner::start("Thinking...");
                    let reply = assistant.submit(&mut session, question).await;
                    spinner.finish();

                    match reply? {
                        Some(answer) => println!("\nassistant> {answer}\n"),
                        None => eprintln!("\n  ! {ANSWER_FAILED}\n"),
                    }
                }
            }
        }
    }

    Ok(session)
}

fn print_header(session: &Session) {
    println!();
    println!("  Strategy assistant: {}", session.game_name());
    match session.reference_url() {
        Some(url) => println!("  Reference URL:      {url}"),
        None => println!("  Reference URL:      none (Gemini web search)"),
    }
    println!("  Commands:           /reset, /quit");
    println!();
}

/// Print `label` and read one line; `None` on end of input.
fn prompt(input: &mut impl BufRead, label: &str) -> Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

// ---------------------------------------------------------------------------
// ask
// ---------------------------------------------------------------------------

async fn cmd_ask(
    config_path: Option<PathBuf>,
    game: &str,
    url: Option<&str>,
    question: &str,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let assistant = Assistant::from_config(&config)?;

    let mut session = Session::new();
    session.start(game, url)?;

    info!(game, has_url = url.is_some(), "asking one-shot question");

    let spinner = Spinner::start("Asking Gemini...");
    let reply = assistant.submit(&mut session, question).await;
    spinner.finish();

    match reply? {
        Some(answer) => {
            println!("{answer}");
            Ok(())
        }
        None => Err(eyre!(ANSWER_FAILED)),
    }
}

// ---------------------------------------------------------------------------
// scrape
// ---------------------------------------------------------------------------

async fn cmd_scrape(url: &str, json: bool, excerpt: usize, links: usize) -> Result<()> {
    let parsed_url = Url::parse(url).map_err(|e| eyre!("invalid URL '{url}': {e}"))?;

    let fetcher = PageFetcher::new()?;
    if !json {
        println!("--- Fetching: {parsed_url} ---");
    }

    let markup = fetcher
        .fetch(&parsed_url)
        .await
        .ok_or_else(|| eyre!("failed to fetch HTML content from {parsed_url}"))?;

    let page = extract(&markup, &parsed_url);

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        print!("{}", render_report(&page, excerpt, links));
    }
    Ok(())
}

/// Human-readable scrape summary.
fn render_report(page: &ExtractedPage, excerpt_chars: usize, max_links: usize) -> String {
    let body_chars = page.body_text.chars().count();
    let excerpt: String = page.body_text.chars().take(excerpt_chars).collect();
    let ellipsis = if body_chars > excerpt_chars { "..." } else { "" };

    let mut out = String::new();
    out.push_str(&format!("\nTitle: {}\n", page.title));
    out.push_str(&format!("\nBody length: {body_chars} characters\n"));
    out.push_str(&format!("\nExcerpt:\n{excerpt}{ellipsis}\n"));
    out.push_str(&format!("\nLinks: {}\n", page.links.len()));
    for link in page.links.iter().take(max_links) {
        out.push_str(&format!("  - {}: {}\n", link.text, link.url));
    }
    out
}

// ---------------------------------------------------------------------------
// models
// ---------------------------------------------------------------------------

async fn cmd_models(config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let client = GeminiClient::new(GeminiSettings::from_env(&config)?)?;

    let models = client.list_models().await?;

    println!("--- Models supporting generateContent ({}) ---", models.len());
    for m in &models {
        println!(
            "Name: {}, Display Name: {}, Supported Methods: {}",
            m.name,
            m.display_name,
            m.supported_generation_methods.join(", ")
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Spinner
// ---------------------------------------------------------------------------

/// Spinner shown while waiting on the network.
struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }

    fn finish(self) {
        self.bar.finish_and_clear();
    }
}
