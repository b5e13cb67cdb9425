//! Translation through a `generateContent`-style model API.

use crate::client::prompt::system_instruction;
use crate::client::Translator;
use crate::config::{TranslatorConfig, WikiConfig};
use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect();
        let text = text.trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

/// Model-backed [`Translator`].
pub struct ModelTranslator {
    http: Client,
    url: String,
    api_key: String,
    instruction: String,
    temperature: f32,
}

impl ModelTranslator {
    /// Errors with `NotConfigured` when no API key is available.
    pub fn new(config: &TranslatorConfig, wiki: &WikiConfig) -> Result<Self, ClientError> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            ClientError::NotConfigured(
                "Translation API key required (set translator.api_key or GEMINI_API_KEY)"
                    .to_string(),
            )
        })?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Request(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            url: format!(
                "{}/models/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_key,
            instruction: system_instruction(&wiki.source_lang, &wiki.target_lang),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl Translator for ModelTranslator {
    async fn translate(&self, text: &str) -> Result<String, ClientError> {
        if text.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "Text is required for translation".to_string(),
            ));
        }

        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &self.instruction,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        debug!(chars = text.chars().count(), "Requesting translation");
        let response = self
            .http
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ClientError::UnexpectedResponse(e.to_string()))?;
        body.into_text().ok_or_else(|| {
            ClientError::UnexpectedResponse("Model returned no candidate text".to_string())
        })
    }
}
