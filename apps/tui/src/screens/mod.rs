//! TUI screen definitions.
//!
//! The app shows exactly one screen at a time, picked by the session phase:
//! the setup form before a session starts and the chat thread after.

mod chat;
mod setup;

pub(crate) use chat::ChatScreen;
pub(crate) use setup::SetupScreen;

/// What a screen asks the app to do after a key press.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    /// Start a session with the entered values.
    Start {
        game_name: String,
        reference_url: String,
    },
    /// Send a question to the assistant.
    Ask(String),
}
