//! Gemini REST client.
//!
//! Sends the whole conversation on every call (`generateContent` keeps no
//! server-side state) with a fixed, fully permissive safety configuration.
//! There is no retry: a failed call is reported once and dropped.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use gameguide_shared::{AppConfig, GameGuideError, Result};

/// Harm categories sent with every request, all set to [`SAFETY_THRESHOLD`].
pub const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Most permissive blocking threshold.
pub const SAFETY_THRESHOLD: &str = "BLOCK_NONE";

/// Method a model must support to be usable for chat.
const GENERATE_CONTENT: &str = "generateContent";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One entry of the `contents` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    /// A single-part text entry.
    pub fn text(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    safety_settings: Vec<SafetySetting>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Serialize, Default)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Serialize, Default)]
struct GoogleSearch {}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
    next_page_token: Option<String>,
}

/// A model advertised by the `models` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Resource name, e.g. `models/gemini-2.5-flash`.
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    pub fn supports_generate_content(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == GENERATE_CONTENT)
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Everything needed to build a [`GeminiClient`].
#[derive(Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub grounding: bool,
    pub timeout: Duration,
}

impl std::fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("grounding", &self.grounding)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiSettings {
    /// Resolve settings from config plus the process environment.
    pub fn from_env(config: &AppConfig) -> Result<Self> {
        Self::resolve(config, |name| std::env::var(name).ok())
    }

    /// Resolve settings from config, reading env vars through `lookup`.
    ///
    /// A missing or blank API key is a config error.
    pub fn resolve(config: &AppConfig, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let gemini = &config.gemini;
        Ok(Self {
            api_key: gemini.api_key_from(&lookup)?,
            model: gemini.model_from(&lookup),
            base_url: gemini.base_url.clone(),
            grounding: gemini.grounding,
            timeout: Duration::from_secs(gemini.timeout_secs),
        })
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Handle to the Gemini API. Build once at startup and pass by reference.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GameGuideError::Network(format!("failed to build HTTP client: {e}")))?;

        info!(model = %settings.model, grounding = settings.grounding, "Gemini client ready");
        Ok(Self { client, settings })
    }

    /// Model id without the `models/` resource prefix.
    pub fn model(&self) -> &str {
        self.settings
            .model
            .strip_prefix("models/")
            .unwrap_or(&self.settings.model)
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!("{}/{suffix}", self.settings.base_url.trim_end_matches('/'))
    }

    /// Ask the model to continue `contents`; `None` on any failure.
    pub async fn ask(&self, contents: &[Content]) -> Option<String> {
        match self.generate(contents).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "Gemini call failed");
                None
            }
        }
    }

    /// Ask the model to continue `contents`, reporting why a call failed.
    #[instrument(skip_all, fields(model = %self.model(), turns = contents.len()))]
    pub async fn generate(&self, contents: &[Content]) -> Result<String> {
        let body = self.request_body(contents);
        let url = self.endpoint(&format!("models/{}:{GENERATE_CONTENT}", self.model()));

        debug!("sending generateContent request");
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GameGuideError::Network(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GameGuideError::Model(describe_http_error(status, &text)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GameGuideError::parse(format!("invalid Gemini response: {e}")))?;

        let text = extract_text(parsed)?;
        info!(chars = text.chars().count(), "answer received");
        Ok(text)
    }

    /// List models that support `generateContent`, following pagination.
    #[instrument(skip_all)]
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.endpoint("models"))
                .header("x-goog-api-key", &self.settings.api_key);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| GameGuideError::Network(format!("model listing failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(GameGuideError::Model(describe_http_error(status, &text)));
            }

            let page: ListModelsResponse = response
                .json()
                .await
                .map_err(|e| GameGuideError::parse(format!("invalid model list: {e}")))?;

            models.extend(
                page.models
                    .into_iter()
                    .filter(ModelInfo::supports_generate_content),
            );

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = models.len(), "models listed");
        Ok(models)
    }

    fn request_body<'a>(&self, contents: &'a [Content]) -> GenerateContentRequest<'a> {
        let tools = if self.settings.grounding {
            vec![Tool::default()]
        } else {
            Vec::new()
        };

        GenerateContentRequest {
            contents,
            safety_settings: SAFETY_CATEGORIES
                .into_iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: SAFETY_THRESHOLD,
                })
                .collect(),
            tools,
        }
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String> {
    let text: String = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GameGuideError::Model(
            "Gemini returned no text in the response candidates".into(),
        ));
    }
    Ok(text)
}

/// Prefer the API's `status: message` over the raw body.
fn describe_http_error(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let message = wrapper.error.message.unwrap_or_else(|| body.to_string());
            match wrapper.error.status {
                Some(s) if !s.is_empty() => format!("{s}: {message}"),
                _ => message,
            }
        })
        .unwrap_or_else(|_| body.to_string());

    format!("HTTP {status}: {detail}")
}
