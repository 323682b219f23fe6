//! Shared types, error model, and configuration for GameGuide.
//!
//! This crate is the foundation depended on by all other GameGuide crates.
//! It provides:
//! - [`GameGuideError`]: the unified error type
//! - Domain types ([`Role`], [`Turn`], [`ExtractedPage`], [`PageLink`])
//! - Configuration ([`AppConfig`], [`GeminiConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, AssistantConfig, GeminiConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{GameGuideError, Result};
pub use types::{ExtractedPage, PageLink, Role, Turn};
