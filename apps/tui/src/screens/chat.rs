//! Chat screen: the conversation thread and the question input.

use crossterm::event::{KeyCode, KeyModifiers};
use gameguide_shared::{Role, Turn};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::Action;

pub(crate) struct ChatScreen {
    input: String,
    /// Rows scrolled up from the bottom of the thread.
    scroll_back: u16,
}

impl ChatScreen {
    pub(crate) fn new() -> Self {
        Self {
            input: String::new(),
            scroll_back: 0,
        }
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }

    pub(crate) fn has_input(&self) -> bool {
        !self.input.is_empty()
    }

    pub(crate) fn draw(
        &self,
        f: &mut Frame,
        area: Rect,
        game_name: &str,
        reference_url: Option<&str>,
        turns: &[Turn],
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // Thread
                Constraint::Length(3), // Input
            ])
            .split(area);

        let title = match reference_url {
            Some(url) => format!(" {game_name} · {url} "),
            None => format!(" {game_name} · web search "),
        };
        let thread_block = Block::default().borders(Borders::ALL).title(title);
        let inner = thread_block.inner(chunks[0]);

        let thread = Paragraph::new(thread_lines(turns)).wrap(Wrap { trim: false });
        let rows = thread.line_count(inner.width);
        let overflow = u16::try_from(rows.saturating_sub(inner.height as usize)).unwrap_or(u16::MAX);
        let offset = overflow.saturating_sub(self.scroll_back);

        f.render_widget(thread.block(thread_block).scroll((offset, 0)), chunks[0]);

        let input_block = Block::default()
            .borders(Borders::ALL)
            .title(" Question · Enter to send · Ctrl-R new game ")
            .border_style(Style::default().fg(Color::Yellow));
        f.render_widget(Paragraph::new(self.input.as_str()).block(input_block), chunks[1]);

        let x = chunks[1].x + 1 + Line::raw(self.input.as_str()).width() as u16;
        f.set_cursor_position((
            x.min(chunks[1].right().saturating_sub(2)),
            chunks[1].y + 1,
        ));
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Action {
        match code {
            KeyCode::Enter => {
                if self.input.trim().is_empty() {
                    return Action::None;
                }
                self.scroll_back = 0;
                return Action::Ask(std::mem::take(&mut self.input));
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::PageUp | KeyCode::Up => {
                self.scroll_back = self.scroll_back.saturating_add(3);
            }
            KeyCode::PageDown | KeyCode::Down => {
                self.scroll_back = self.scroll_back.saturating_sub(3);
            }
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
            }
            _ => {}
        }
        Action::None
    }
}

/// The transcript as labelled lines; wrapping is left to the paragraph.
fn thread_lines(turns: &[Turn]) -> Vec<Line<'_>> {
    let mut lines = Vec::new();

    for turn in turns {
        let (label, color) = match turn.role {
            Role::User => ("You", Color::Cyan),
            Role::Assistant => ("Assistant", Color::Green),
        };
        lines.push(Line::from(label).style(Style::default().fg(color).add_modifier(Modifier::BOLD)));
        lines.extend(turn.content.lines().map(Line::from));
        lines.push(Line::from(""));
    }

    lines
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;

    use super::*;

    #[test]
    fn enter_sends_and_clears_input() {
        let mut screen = ChatScreen::new();
        for c in "Where?".chars() {
            screen.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        let action = screen.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(action, Action::Ask("Where?".into()));
        assert!(!screen.has_input());
    }

    #[test]
    fn blank_input_is_not_sent() {
        let mut screen = ChatScreen::new();
        screen.handle_key(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(screen.handle_key(KeyCode::Enter, KeyModifiers::NONE), Action::None);
    }

    fn render(screen: &ChatScreen, turns: &[Turn], width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| screen.draw(f, f.area(), "Zelda", None, turns))
            .unwrap();

        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| (0..width).map(|x| buffer[(x, y)].symbol()).collect())
            .collect()
    }

    #[test]
    fn long_answers_wrap_on_word_boundaries() {
        let turns = vec![Turn::assistant("Use the Ultrahand to attach fans to the raft")];
        let rows = render(&ChatScreen::new(), &turns, 20, 12);

        assert!(rows.iter().any(|row| row.contains("Ultrahand")));
        assert!(rows.iter().all(|row| !row.contains("Ultr ") && !row.contains(" ahand")));
    }

    #[test]
    fn thread_follows_latest_turn() {
        let turns: Vec<Turn> = (0..20)
            .flat_map(|i| [Turn::user(format!("question {i}")), Turn::assistant(format!("answer {i}"))])
            .collect();
        let rows = render(&ChatScreen::new(), &turns, 40, 16);

        assert!(rows.iter().any(|row| row.contains("answer 19")));
        assert!(!rows.iter().any(|row| row.contains("question 0 ")));
    }

    #[test]
    fn thread_labels_each_turn() {
        let turns = vec![Turn::assistant("Welcome"), Turn::user("Hi")];
        let lines = thread_lines(&turns);
        let text: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(text, vec!["Assistant", "Welcome", "", "You", "Hi", ""]);
    }
}
