//! Turning a session transcript into a `generateContent` payload.
//!
//! Index 0 of every transcript is the UI-only welcome turn and is never
//! sent. The first user question after it is wrapped in an instruction
//! template carrying the game name (and reference URL, when set). Every
//! other turn is forwarded verbatim.

use gameguide_shared::{AssistantConfig, Role, Turn};

use crate::model::Content;
use crate::session::Session;

/// Knobs for the first-question templates.
#[derive(Debug, Clone)]
pub struct PromptOptions {
    /// Language the answer should be written in.
    pub answer_language: String,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self::from(&AssistantConfig::default())
    }
}

impl From<&AssistantConfig> for PromptOptions {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            answer_language: config.answer_language.clone(),
        }
    }
}

/// Build the exact payload for the model from `session`.
pub fn build_payload(session: &Session, options: &PromptOptions) -> Vec<Content> {
    build_contents(
        session.turns(),
        session.game_name(),
        session.reference_url(),
        options,
    )
}

/// Same as [`build_payload`] over raw parts, for callers without a [`Session`].
pub fn build_contents(
    turns: &[Turn],
    game_name: &str,
    reference_url: Option<&str>,
    options: &PromptOptions,
) -> Vec<Content> {
    let mut contents = Vec::with_capacity(turns.len().saturating_sub(1));
    let mut first_question_seen = false;

    for turn in turns.iter().skip(1) {
        let text = if turn.role == Role::User && !first_question_seen {
            first_question_seen = true;
            render_first_question(game_name, reference_url, &turn.content, &options.answer_language)
        } else {
            turn.content.clone()
        };
        contents.push(Content::text(turn.role.wire_name(), text));
    }

    contents
}

/// Wrap the opening question in the assistant instructions.
///
/// All inputs are interpolated as-is.
pub fn render_first_question(
    game_name: &str,
    reference_url: Option<&str>,
    question: &str,
    answer_language: &str,
) -> String {
    let instruction = match reference_url {
        Some(url) => format!(
            "You are a video game strategy assistant. To answer the user's question, \
             **consult the provided URL ({url}) first**, and use web search (grounding) \
             only when that page does not answer the question or more detail is needed. \
             Give the most accurate and useful strategy information you can."
        ),
        None => "You are a video game strategy assistant. To answer the user's question, \
                 **use web search (grounding)** and give the most accurate and useful \
                 strategy information you can."
            .to_string(),
    };

    format!(
        "{instruction}\n\
         Write the answer for players in clear, well-organized, natural {answer_language}.\n\
         \n\
         ---\n\
         **Game:** {game_name}\n\
         ---\n\
         User question: {question}"
    )
}
