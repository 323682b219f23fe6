//! Core TUI application state and event loop.

use std::io;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use gameguide_core::{ANSWER_FAILED, Assistant, Session, SessionPhase};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tracing::{error, info};

use crate::screens::{Action, ChatScreen, SetupScreen};
use crate::widgets::status_bar;

const READY: &str = "Ready · press ? for help";

/// Application state.
pub(crate) struct App {
    /// The conversation; its phase picks the visible screen.
    pub session: Session,
    pub setup: SetupScreen,
    pub chat: ChatScreen,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Status message shown in bottom bar.
    pub status: String,
    /// Whether help overlay is visible.
    pub show_help: bool,
    /// Question waiting for the next model call.
    pub pending_question: Option<String>,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            session: Session::new(),
            setup: SetupScreen::new(),
            chat: ChatScreen::new(),
            should_quit: false,
            status: READY.to_string(),
            show_help: false,
            pending_question: None,
        }
    }

    fn has_input(&self) -> bool {
        match self.session.phase() {
            SessionPhase::Setup => self.setup.has_input(),
            SessionPhase::Chat => self.chat.has_input(),
        }
    }

    fn start_session(&mut self, game_name: &str, reference_url: &str) {
        match self.session.start(game_name, Some(reference_url)) {
            Ok(()) => {
                self.chat.clear();
                self.status = format!("Chatting about {}", self.session.game_name());
            }
            Err(e) => self.setup.warn(e.to_string()),
        }
    }

    fn reset(&mut self) {
        self.session.reset();
        self.setup.clear();
        self.chat.clear();
        self.pending_question = None;
        self.status = "Session reset · enter a new game".to_string();
    }
}

/// Set up the terminal, run the event loop, then restore the terminal.
pub(crate) fn run(assistant: Assistant) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &runtime, &assistant);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    runtime: &tokio::runtime::Runtime,
    assistant: &Assistant,
) -> Result<()> {
    let mut app = App::new();
    info!("tui started");

    loop {
        terminal.draw(|f| draw(f, &app))?;

        // Poll for events with 100ms timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(&mut app, key.code, key.modifiers);
                }
            }
        }

        if let Some(question) = app.pending_question.take() {
            app.status = "Thinking…".to_string();
            terminal.draw(|f| draw(f, &app))?;

            match runtime.block_on(assistant.submit(&mut app.session, question)) {
                Ok(Some(_)) => app.status = READY.to_string(),
                Ok(None) => app.status = ANSWER_FAILED.to_string(),
                Err(e) => {
                    error!(error = %e, "question rejected");
                    app.status = e.to_string();
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    // Global keybindings (always active)
    match code {
        KeyCode::Char('q') | KeyCode::Char('c')
            if modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.show_help = false;
            app.reset();
            return;
        }
        // `?` only opens help when it would not be part of typed text.
        KeyCode::Char('?') if !app.has_input() && !app.show_help => {
            app.show_help = true;
            return;
        }
        KeyCode::F(1) => {
            app.show_help = !app.show_help;
            return;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Delegate to current screen
    let action = match app.session.phase() {
        SessionPhase::Setup => app.setup.handle_key(code, modifiers),
        SessionPhase::Chat => app.chat.handle_key(code, modifiers),
    };

    match action {
        Action::None => {}
        Action::Start {
            game_name,
            reference_url,
        } => app.start_session(&game_name, &reference_url),
        Action::Ask(question) => app.pending_question = Some(question),
    }
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let title = Paragraph::new(Line::from(" 🎮 Game Strategy Assistant (Gemini)").style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    // Content area, picked by session phase
    match app.session.phase() {
        SessionPhase::Setup => app.setup.draw(f, chunks[1]),
        SessionPhase::Chat => app.chat.draw(
            f,
            chunks[1],
            app.session.game_name(),
            app.session.reference_url(),
            app.session.turns(),
        ),
    }

    // Status bar
    let bar = status_bar(&app.status);
    f.render_widget(bar, chunks[2]);

    // Help overlay
    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  ? / F1       Toggle this help"),
        Line::from("  Ctrl-R       Reset and pick another game"),
        Line::from("  Ctrl-Q/C     Quit"),
        Line::from(""),
        Line::from("Setup:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  Tab          Switch between game and URL"),
        Line::from("  Enter        Start the session"),
        Line::from(""),
        Line::from("Chat:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  Enter        Send the question"),
        Line::from("  ↑/↓ PgUp/Dn  Scroll the conversation"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help · press any key to close ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
