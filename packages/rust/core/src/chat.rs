//! Question → answer round trip over a [`Session`].

use tracing::{info, instrument, warn};

use gameguide_shared::{AppConfig, GameGuideError, Result};

use crate::model::GeminiClient;
use crate::session::Session;
use crate::transcript::{PromptOptions, build_payload};

/// Message shown when the model gave nothing back.
pub const ANSWER_FAILED: &str = "Failed to get an answer from Gemini.";

/// Drives the model for one session at a time.
#[derive(Debug, Clone)]
pub struct Assistant {
    client: GeminiClient,
    options: PromptOptions,
}

impl Assistant {
    pub fn new(client: GeminiClient, options: PromptOptions) -> Self {
        Self { client, options }
    }

    /// Resolve settings from `config` + env and build the client once.
    ///
    /// Fails when the API key is missing.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let settings = crate::model::GeminiSettings::from_env(config)?;
        let client = GeminiClient::new(settings)?;
        Ok(Self::new(client, PromptOptions::from(&config.assistant)))
    }

    /// Record `question` and ask for an answer.
    ///
    /// See [`Assistant::respond`] for the return value.
    pub async fn submit(
        &self,
        session: &mut Session,
        question: impl Into<String>,
    ) -> Result<Option<String>> {
        ensure_started(session)?;
        session.push_question(question);
        self.respond(session).await
    }

    /// Send the transcript and append the answer, if one came back.
    ///
    /// `Ok(None)` means the model call failed; the transcript then ends with
    /// the unanswered question and no placeholder answer.
    #[instrument(skip_all, fields(game = %session.game_name(), turns = session.turns().len()))]
    pub async fn respond(&self, session: &mut Session) -> Result<Option<String>> {
        ensure_started(session)?;

        let payload = build_payload(session, &self.options);
        if payload.is_empty() {
            return Err(GameGuideError::validation("no question to answer"));
        }

        match self.client.ask(&payload).await {
            Some(answer) => {
                session.push_answer(answer.clone());
                info!(turns = session.turns().len(), "answer appended");
                Ok(Some(answer))
            }
            None => {
                warn!("no answer; transcript left unchanged");
                Ok(None)
            }
        }
    }
}

fn ensure_started(session: &Session) -> Result<()> {
    if session.is_started() {
        Ok(())
    } else {
        Err(GameGuideError::validation(
            "start a session with a game name first",
        ))
    }
}
