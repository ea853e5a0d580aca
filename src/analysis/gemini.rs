//! Gemini client for clip analysis.
//!
//! Sends the inlined video, the coaching persona and the user instruction to
//! the `generateContent` REST endpoint and returns the response text. There
//! is no retry and no timeout: a failed call is reported once and the caller
//! decides what happens next.

use super::prompt::{user_instruction, SYSTEM_INSTRUCTION};
use super::{with_fallback, AnalysisRequest, Analyzer};
use crate::config::AnalysisConfig;
use crate::credentials::GeminiCredentials;
use crate::error::AnalysisError;
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini `generateContent` API.
pub(crate) struct GeminiClient {
    credentials: Option<GeminiCredentials>,
    api_base_url: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

/// Request body for `generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
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

/// One part of a content block: either text or inlined binary data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    InlineData(InlineData<'a>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Response from `generateContent`.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
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
    text: Option<String>,
}

impl GeminiClient {
    /// Create a client. Missing credentials are reported on each call, not here.
    pub(crate) fn new(
        config: &AnalysisConfig,
        credentials: Option<GeminiCredentials>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("matchvision/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client for GeminiClient")?;

        Ok(Self {
            credentials,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base_url, self.model
        )
    }

    /// Extract text from the first candidate, joining its text parts.
    fn extract_text(response: GenerateContentResponse) -> String {
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Analyzer for GeminiClient {
    #[instrument(
        skip(self, request),
        fields(model = %self.model, mime_type = %request.mime_type, payload_len = request.payload.len())
    )]
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String, AnalysisError> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            error!("Gemini API key is missing");
            AnalysisError::MissingApiKey
        })?;

        let instruction = user_instruction(request.focus.as_deref());
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text(SYSTEM_INSTRUCTION)],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![
                    Part::InlineData(InlineData {
                        mime_type: &request.mime_type,
                        data: &request.payload,
                    }),
                    Part::Text(&instruction),
                ],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        info!("Sending clip to Gemini");
        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, credentials.api_key())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Gemini request failed");
            return Err(AnalysisError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            AnalysisError::InvalidResponse(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text = with_fallback(Self::extract_text(parsed));
        info!(response_len = text.len(), "Gemini analysis received");
        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
