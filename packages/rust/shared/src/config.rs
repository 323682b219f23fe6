//! Application configuration for GameGuide.
//!
//! User config lives at `~/.gameguide/gameguide.toml`.
//! Environment variables override config file values, which override defaults.
//! The API key itself is never written to the config file; only the name of
//! the environment variable holding it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GameGuideError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "gameguide.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".gameguide";

// ---------------------------------------------------------------------------
// Config structs (matching gameguide.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini endpoint settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Prompt settings.
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// `[gemini]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Name of the env var that may override the model id.
    #[serde(default = "default_model_env")]
    pub model_env: String,

    /// Model used when the override env var is unset.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// REST base URL, up to and including the API version.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Attach the `google_search` tool so the model can ground answers.
    #[serde(default = "default_true")]
    pub grounding: bool,

    /// Whole-request timeout for a model call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model_env: default_model_env(),
            default_model: default_model(),
            base_url: default_base_url(),
            grounding: true,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_model_env() -> String {
    "GEMINI_MODEL".into()
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_true() -> bool {
    true
}
fn default_timeout_secs() -> u64 {
    120
}

/// `[assistant]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Language the first-turn instructions ask the model to answer in.
    #[serde(default = "default_answer_language")]
    pub answer_language: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            answer_language: default_answer_language(),
        }
    }
}

fn default_answer_language() -> String {
    "Japanese".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.gameguide/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| GameGuideError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.gameguide/gameguide.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| GameGuideError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        GameGuideError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| GameGuideError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| GameGuideError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| GameGuideError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

impl GeminiConfig {
    /// Read the API key through `lookup` (normally `std::env::var`).
    pub fn api_key_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
        let var_name = &self.api_key_env;
        match lookup(var_name) {
            Some(val) if !val.trim().is_empty() => Ok(val.trim().to_string()),
            _ => Err(GameGuideError::config(format!(
                "Gemini API key not found. Set the {var_name} environment variable.\n\
                 Example: export {var_name}='YOUR_API_KEY_HERE'"
            ))),
        }
    }

    /// Resolve the model id: the override env var if set, else `default_model`.
    pub fn model_from(&self, lookup: impl Fn(&str) -> Option<String>) -> String {
        lookup(&self.model_env)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.default_model.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("GEMINI_API_KEY"));
        assert!(toml_str.contains("answer_language"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.gemini.default_model, "gemini-2.5-flash");
        assert_eq!(parsed.gemini.timeout_secs, 120);
        assert!(parsed.gemini.grounding);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[gemini]
default_model = "gemini-2.5-pro"
grounding = false
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.gemini.default_model, "gemini-2.5-pro");
        assert!(!config.gemini.grounding);
        assert_eq!(config.gemini.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.assistant.answer_language, "Japanese");
    }

    #[test]
    fn api_key_missing_names_the_env_var() {
        let mut config = GeminiConfig::default();
        config.api_key_env = "GG_TEST_KEY".into();
        let err = config.api_key_from(|_| None).unwrap_err();
        assert!(matches!(err, GameGuideError::Config { .. }));
        assert!(err.to_string().contains("API key not found"));
        assert!(err.to_string().contains("GG_TEST_KEY"));
    }

    #[test]
    fn api_key_blank_is_rejected() {
        let config = GeminiConfig::default();
        let result = config.api_key_from(|_| Some("   ".into()));
        assert!(result.is_err());

        let key = config
            .api_key_from(|name| (name == "GEMINI_API_KEY").then(|| "secret".to_string()))
            .expect("key");
        assert_eq!(key, "secret");
    }

    #[test]
    fn model_override_and_fallback() {
        let config = GeminiConfig::default();
        assert_eq!(config.model_from(|_| None), "gemini-2.5-flash");
        assert_eq!(config.model_from(|_| Some(String::new())), "gemini-2.5-flash");
        assert_eq!(
            config.model_from(|name| (name == "GEMINI_MODEL").then(|| "gemini-2.5-pro".into())),
            "gemini-2.5-pro"
        );
    }
}
