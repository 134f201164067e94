use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{ApiFlavor, AppConfig, ConfigError};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to model service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("model refused to answer: {0}")]
    Refusal(String),
    #[error("model response contained no output text")]
    MissingOutput,
    #[error("unexpected model response body: {0}")]
    Decode(#[source] serde_json::Error),
}

/// A single schema-constrained generation request.
#[derive(Debug, Clone, Copy)]
pub struct StructuredRequest<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub user: &'a str,
    pub schema_name: &'a str,
    pub schema: &'a Value,
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Returns the raw JSON text produced by the model.
    async fn generate_structured(&self, request: StructuredRequest<'_>) -> Result<String, ProviderError>;
}

/// Build the provider selected by the configuration.
pub fn provider_from_config(config: &AppConfig) -> Result<Arc<dyn LLMProvider>, ConfigError> {
    let api_key = config.api_key.clone().ok_or(ConfigError::MissingApiKey)?;
    let provider: Arc<dyn LLMProvider> = match config.api {
        ApiFlavor::Responses => Arc::new(ResponsesProvider::new(config.base_url.clone(), api_key)),
        ApiFlavor::ChatCompletions => Arc::new(OpenAICompatibleProvider::new(
            config.base_url.clone(),
            Some(api_key),
        )),
    };
    Ok(provider)
}

async fn send_json(
    client: &Client,
    url: String,
    api_key: Option<&str>,
    body: &Value,
) -> Result<Value, ProviderError> {
    let mut request = client.post(url).json(body);
    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }

    let res = request.send().await?;
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(ProviderError::Status { status, body });
    }
    Ok(res.json().await?)
}

/// OpenAI Responses API (`POST {base}/responses`) with a `json_schema` text format.
pub struct ResponsesProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ResponsesProvider {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }
}

#[derive(Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputContent {
    OutputText { text: String },
    Refusal { refusal: String },
    #[serde(other)]
    Other,
}

#[async_trait]
impl LLMProvider for ResponsesProvider {
    async fn generate_structured(&self, request: StructuredRequest<'_>) -> Result<String, ProviderError> {
        let body = json!({
            "model": request.model,
            "input": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "text": {
                "format": {
                    "type": "json_schema",
                    "name": request.schema_name,
                    "schema": request.schema,
                    "strict": true,
                }
            },
        });

        let url = format!("{}/responses", self.base_url.trim_end_matches('/'));
        let value = send_json(&self.client, url, Some(&self.api_key), &body).await?;
        let parsed: ResponsesBody = serde_json::from_value(value).map_err(ProviderError::Decode)?;

        let mut text = String::new();
        for item in parsed.output.into_iter().filter(|item| item.kind == "message") {
            for content in item.content {
                match content {
                    OutputContent::OutputText { text: t } => text.push_str(&t),
                    OutputContent::Refusal { refusal } => return Err(ProviderError::Refusal(refusal)),
                    OutputContent::Other => {}
                }
            }
        }

        if text.is_empty() {
            return Err(ProviderError::MissingOutput);
        }
        Ok(text)
    }
}

/// Any server speaking the `/chat/completions` dialect with `response_format` support.
pub struct OpenAICompatibleProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAICompatibleProvider {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    async fn generate_structured(&self, request: StructuredRequest<'_>) -> Result<String, ProviderError> {
        let body = json!({
            "model": request.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema_name,
                    "schema": request.schema,
                    "strict": true,
                }
            },
        });

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let json = send_json(&self.client, url, self.api_key.as_deref(), &body).await?;

        let message = &json["choices"][0]["message"];
        if let Some(refusal) = message["refusal"].as_str() {
            return Err(ProviderError::Refusal(refusal.to_string()));
        }
        message["content"]
            .as_str()
            .map(str::to_string)
            .ok_or(ProviderError::MissingOutput)
    }
}
