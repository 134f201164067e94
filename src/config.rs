//! Runtime configuration
//!
//! Everything is read from the process environment (optionally seeded from a
//! `.env` file by the binaries) with defaults for all but the API key.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::classifier::DEFAULT_MODEL;
use crate::pdf::DEFAULT_PAGE_LIMIT;

pub const DEFINITIONS_FILE: &str = "definitions.json";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";
pub const DEFAULT_MAX_INPUT_TOKENS: usize = 100_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
    #[error("invalid value for {key}: `{value}`")]
    InvalidValue { key: &'static str, value: String },
}

/// Which wire dialect the model service speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFlavor {
    Responses,
    ChatCompletions,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub api: ApiFlavor,
    /// Path to the taxonomy definitions
    pub definitions_path: PathBuf,
    pub strict_subcategory: bool,
    /// Pages read from each uploaded PDF
    pub pdf_pages: usize,
    /// Upper bound on text sent to the model from the web front end
    pub max_input_tokens: usize,
    pub bind: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api: ApiFlavor::Responses,
            definitions_path: default_definitions_path(),
            strict_subcategory: false,
            pdf_pages: DEFAULT_PAGE_LIMIT,
            max_input_tokens: DEFAULT_MAX_INPUT_TOKENS,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.api_key = get("OPENAI_API_KEY");
        if let Some(url) = get("OPENAI_BASE_URL") {
            config.base_url = url;
        }
        if let Some(model) = get("CLASSIFIER_MODEL") {
            config.model = model;
        }
        if let Some(api) = get("CLASSIFIER_API") {
            config.api = match api.to_lowercase().as_str() {
                "responses" => ApiFlavor::Responses,
                "chat" | "chat_completions" => ApiFlavor::ChatCompletions,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "CLASSIFIER_API",
                        value: api,
                    })
                }
            };
        }
        if let Some(path) = get("CLASSIFIER_DEFINITIONS") {
            config.definitions_path = PathBuf::from(path);
        }
        if let Some(value) = get("CLASSIFIER_STRICT_SUBCATEGORY") {
            config.strict_subcategory = parse_bool("CLASSIFIER_STRICT_SUBCATEGORY", value)?;
        }
        if let Some(value) = get("CLASSIFIER_PDF_PAGES") {
            config.pdf_pages = parse_count("CLASSIFIER_PDF_PAGES", value)?;
        }
        if let Some(value) = get("CLASSIFIER_MAX_INPUT_TOKENS") {
            config.max_input_tokens = parse_count("CLASSIFIER_MAX_INPUT_TOKENS", value)?;
        }
        if let Some(bind) = get("CLASSIFIER_BIND") {
            config.bind = bind;
        }

        Ok(config)
    }
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value }),
    }
}

fn parse_count(key: &'static str, value: String) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue { key, value }),
    }
}

/// `definitions.json` next to the executable, else the one shipped with the crate.
pub fn default_definitions_path() -> PathBuf {
    if let Some(dir) = std::env::current_exe().ok().as_deref().and_then(Path::parent) {
        let candidate = dir.join(DEFINITIONS_FILE);
        if candidate.is_file() {
            return candidate;
        }
    }
    Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFINITIONS_FILE)
}
