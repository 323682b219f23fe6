//! GameGuide core: sessions, prompt construction, and the Gemini client.
//!
//! - [`session`]: the [`Session`] value and its start/reset lifecycle
//! - [`transcript`]: session transcript → `generateContent` payload
//! - [`model`]: the Gemini REST client
//! - [`chat`]: [`Assistant`], one question/answer round trip

pub mod chat;
pub mod model;
pub mod session;
pub mod transcript;

pub use chat::{ANSWER_FAILED, Assistant};
pub use model::{Content, GeminiClient, GeminiSettings, ModelInfo, Part};
pub use session::{Session, SessionPhase, welcome_message};
pub use transcript::{PromptOptions, build_contents, build_payload, render_first_question};
