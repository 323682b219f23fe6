//! Chat session state and its start/reset lifecycle.
//!
//! A [`Session`] is owned by whichever UI drives the conversation and is
//! passed by `&mut` through the request path. The default value is the
//! empty "not started" state.

use gameguide_shared::{GameGuideError, Result, Role, Turn};
use tracing::info;

/// Which screen a session currently belongs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for a game name (and optional URL).
    Setup,
    /// Game chosen; questions can be asked.
    Chat,
}

/// One conversation about one game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    game_name: String,
    reference_url: Option<String>,
    transcript: Vec<Turn>,
}

impl Session {
    /// An empty, not-yet-started session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the session for `game_name`.
    ///
    /// Fails without touching any state when the game name is blank.
    /// A blank `reference_url` counts as absent; anything else is kept verbatim.
    /// On success the transcript holds exactly the welcome turn.
    pub fn start(&mut self, game_name: &str, reference_url: Option<&str>) -> Result<()> {
        if game_name.trim().is_empty() {
            return Err(GameGuideError::validation("enter a game name"));
        }

        let reference_url = reference_url
            .filter(|u| !u.trim().is_empty())
            .map(str::to_string);

        self.game_name = game_name.to_string();
        self.reference_url = reference_url;
        self.transcript.clear();
        self.transcript
            .push(Turn::assistant(welcome_message(&self.game_name, self.reference_url.as_deref())));

        info!(
            game = %self.game_name,
            has_reference_url = self.reference_url.is_some(),
            "session started"
        );
        Ok(())
    }

    /// Drop the game name, reference URL, and transcript.
    pub fn reset(&mut self) {
        *self = Self::default();
        info!("session reset");
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_started() {
            SessionPhase::Chat
        } else {
            SessionPhase::Setup
        }
    }

    pub fn is_started(&self) -> bool {
        !self.game_name.is_empty()
    }

    pub fn game_name(&self) -> &str {
        &self.game_name
    }

    pub fn reference_url(&self) -> Option<&str> {
        self.reference_url.as_deref()
    }

    /// The full transcript, welcome turn included.
    pub fn turns(&self) -> &[Turn] {
        &self.transcript
    }

    /// Append a user question.
    pub fn push_question(&mut self, text: impl Into<String>) {
        self.transcript.push(Turn::new(Role::User, text));
    }

    /// Append an assistant answer.
    pub fn push_answer(&mut self, text: impl Into<String>) {
        self.transcript.push(Turn::new(Role::Assistant, text));
    }
}

/// UI-only greeting placed at index 0 of every fresh transcript.
pub fn welcome_message(game_name: &str, reference_url: Option<&str>) -> String {
    let mut message = format!("Starting the strategy assistant for **{game_name}**.\n\n");
    match reference_url {
        Some(url) => message.push_str(&format!(
            "Reference URL received: **{url}**. Answers will prioritize this page.\n"
        )),
        None => message.push_str(
            "No reference URL was given, so answers will use **web search (grounding)**.\n",
        ),
    }
    message.push_str("What would you like to know?");
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_empty() {
        let session = Session::new();
        assert_eq!(session.phase(), SessionPhase::Setup);
        assert_eq!(session.game_name(), "");
        assert_eq!(session.reference_url(), None);
        assert!(session.turns().is_empty());
    }

    #[test]
    fn start_requires_game_name() {
        let mut session = Session::new();
        let err = session.start("   ", Some("https://a.example")).unwrap_err();
        assert!(matches!(err, GameGuideError::Validation { .. }));
        assert_eq!(session, Session::default());
    }

    #[test]
    fn start_adds_welcome_turn() {
        let mut session = Session::new();
        session
            .start("Elden Ring", Some("https://wiki.example/elden"))
            .unwrap();

        assert_eq!(session.phase(), SessionPhase::Chat);
        assert_eq!(session.turns().len(), 1);
        let welcome = &session.turns()[0];
        assert_eq!(welcome.role, Role::Assistant);
        assert!(welcome.content.contains("Elden Ring"));
        assert!(welcome.content.contains("https://wiki.example/elden"));
    }

    #[test]
    fn blank_url_counts_as_absent() {
        let mut session = Session::new();
        session.start("Tetris", Some("  ")).unwrap();
        assert_eq!(session.reference_url(), None);
        assert!(session.turns()[0].content.contains("web search"));
    }

    #[test]
    fn reset_clears_everything() {
        let mut session = Session::new();
        session
            .start("Hades", Some("https://hades.example/boons"))
            .unwrap();
        session.push_question("Best boon for Zeus?");
        session.push_answer("Lightning Strike.");

        session.reset();

        assert_eq!(session.game_name(), "");
        assert_eq!(session.reference_url(), None);
        assert!(session.turns().is_empty());
        assert_eq!(session.phase(), SessionPhase::Setup);
    }

    #[test]
    fn restart_after_reset_mentions_only_new_values() {
        let mut session = Session::new();
        session
            .start("Hades", Some("https://hades.example/boons"))
            .unwrap();
        session.push_question("Q");
        session.reset();
        session.start("Celeste", None).unwrap();

        assert_eq!(session.turns().len(), 1);
        let welcome = &session.turns()[0].content;
        assert!(welcome.contains("Celeste"));
        assert!(!welcome.contains("Hades"));
        assert!(!welcome.contains("hades.example"));
    }

    #[test]
    fn turns_append_in_order() {
        let mut session = Session::new();
        session.start("Celeste", None).unwrap();
        session.push_question("How do I dash?");
        session.push_answer("Press X.");

        let roles: Vec<Role> = session.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::Assistant, Role::User, Role::Assistant]);
    }
}
