//! Session setup form: game name (required) and reference URL (optional).

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::Action;

/// Which input field is focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Game,
    Url,
}

pub(crate) struct SetupScreen {
    game_name: String,
    reference_url: String,
    focused: Field,
    warning: Option<String>,
}

impl SetupScreen {
    pub(crate) fn new() -> Self {
        Self {
            game_name: String::new(),
            reference_url: String::new(),
            focused: Field::Game,
            warning: None,
        }
    }

    /// Show a validation message under the form.
    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        self.warning = Some(message.into());
    }

    /// Empty the form for the next session.
    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }

    /// Whether the focused field has text that a `?` would append to.
    pub(crate) fn has_input(&self) -> bool {
        match self.focused {
            Field::Game => !self.game_name.is_empty(),
            Field::Url => !self.reference_url.is_empty(),
        }
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(4), // Intro
                Constraint::Length(3), // Game
                Constraint::Length(3), // URL
                Constraint::Length(2), // Hint
                Constraint::Min(1),    // Warning
            ])
            .split(area);

        let intro = Paragraph::new(vec![
            Line::from("Game Strategy Assistant").style(Style::default().add_modifier(Modifier::BOLD)),
            Line::from("Enter the game you want help with. A reference guide URL is optional;"),
            Line::from("without one, answers come from Gemini's web search."),
        ]);
        f.render_widget(intro, chunks[0]);

        self.draw_field(f, chunks[1], Field::Game, " Game name (required) ", &self.game_name);
        self.draw_field(
            f,
            chunks[2],
            Field::Url,
            " Reference URL (optional) ",
            &self.reference_url,
        );

        let hint = Paragraph::new("Tab to switch field · Enter to start · Ctrl-Q to quit")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint, chunks[3]);

        if let Some(warning) = &self.warning {
            let warn = Paragraph::new(format!("⚠ {warning}"))
                .style(Style::default().fg(Color::Yellow))
                .wrap(Wrap { trim: true });
            f.render_widget(warn, chunks[4]);
        }
    }

    fn draw_field(&self, f: &mut Frame, area: Rect, field: Field, title: &str, value: &str) {
        let style = if self.focused == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(style);
        f.render_widget(Paragraph::new(value).block(block), area);

        if self.focused == field {
            let x = area.x + 1 + Line::raw(value).width() as u16;
            f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
        }
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Action {
        match code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.focused = match self.focused {
                    Field::Game => Field::Url,
                    Field::Url => Field::Game,
                };
            }
            KeyCode::Enter => {
                return Action::Start {
                    game_name: self.game_name.trim().to_string(),
                    reference_url: self.reference_url.trim().to_string(),
                };
            }
            KeyCode::Backspace => {
                self.current_field_mut().pop();
            }
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                self.current_field_mut().push(c);
                self.warning = None;
            }
            _ => {}
        }
        Action::None
    }

    fn current_field_mut(&mut self) -> &mut String {
        match self.focused {
            Field::Game => &mut self.game_name,
            Field::Url => &mut self.reference_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(screen: &mut SetupScreen, s: &str) {
        for c in s.chars() {
            screen.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn enter_submits_both_fields() {
        let mut screen = SetupScreen::new();
        type_str(&mut screen, "Hades");
        screen.handle_key(KeyCode::Tab, KeyModifiers::NONE);
        type_str(&mut screen, " https://hades.example ");

        let action = screen.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(
            action,
            Action::Start {
                game_name: "Hades".into(),
                reference_url: "https://hades.example".into(),
            }
        );
    }

    #[test]
    fn typing_clears_warning() {
        let mut screen = SetupScreen::new();
        screen.warn("enter a game name");
        assert!(screen.warning.is_some());
        type_str(&mut screen, "T");
        assert!(screen.warning.is_none());
    }

    #[test]
    fn backspace_edits_focused_field() {
        let mut screen = SetupScreen::new();
        type_str(&mut screen, "Doomx");
        screen.handle_key(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(screen.game_name, "Doom");
        assert!(screen.reference_url.is_empty());
    }
}
