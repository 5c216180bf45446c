//! REST client for the hosted Gemini API.
//!
//! Both text and image generation go through `models/{model}:generateContent`.
//! A chat exchange is expressed by sending the prior turns as `contents`
//! ahead of the new user message.

use crate::backend::{
    ContentRole, GenerationConfig, ImageRequest, ImageResponse, InferenceBackend, InlineImage,
    TextRequest, TextResponse, TokenUsage,
};
use crate::error::LlmError;
use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Connection settings for [`GeminiBackend`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API credential.
    pub api_key: String,
    /// API root, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Optional per-request timeout. None waits for the backend.
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl GeminiConfig {
    /// Creates a configuration pointing at the public API.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            request_timeout_seconds: None,
        }
    }
}

/// Inference backend that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiBackend {
    /// Builds the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the client cannot be built.
    pub fn new(config: GeminiConfig) -> nexus_core::Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::InvalidConfig {
                reason: "inference API key is empty".to_string(),
            }
            .into());
        }

        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| LlmError::InvalidConfig {
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.base_url)
    }

    async fn send(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError> {
        let url = self.endpoint(model);
        debug!(endpoint = %url, contents = body.contents.len(), "sending generateContent");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response.text().await.unwrap_or_default();
            warn!(status = %status, model, "inference API returned error");
            return Err(map_http_error(status, &body_text, retry_after));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| LlmError::ResponseParseFailed {
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl InferenceBackend for GeminiBackend {
    #[instrument(skip_all, fields(model = %request.model, chat = request.is_chat()))]
    async fn generate_text(&self, request: &TextRequest) -> Result<TextResponse, LlmError> {
        let body = GenerateContentRequest::from_text_request(request);
        let response = self.send(&request.model, &body).await?;
        let usage = response.usage();

        Ok(TextResponse {
            text: response.text(),
            usage,
            model: request.model.clone(),
        })
    }

    #[instrument(skip_all, fields(model = %request.model))]
    async fn generate_image(&self, request: &ImageRequest) -> Result<ImageResponse, LlmError> {
        let body = GenerateContentRequest {
            contents: vec![Content::text(ContentRole::User, &request.prompt)],
            system_instruction: None,
            generation_config: None,
        };

        let response = self.send(&request.model, &body).await?;
        let text = Some(response.text()).filter(|t| !t.is_empty());

        Ok(ImageResponse {
            images: response.images(),
            text,
        })
    }

    fn provider(&self) -> &str {
        "gemini"
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig>,
}

impl GenerateContentRequest {
    /// Prior turns first, then the new user message.
    fn from_text_request(request: &TextRequest) -> Self {
        let mut contents: Vec<Content> = request
            .history
            .iter()
            .map(|turn| Content::text(turn.role, &turn.text))
            .collect();
        contents.push(Content::text(ContentRole::User, &request.prompt));

        Self {
            contents,
            system_instruction: request
                .config
                .system_instruction
                .as_deref()
                .map(SystemInstruction::new),
            generation_config: WireGenerationConfig::from_config(&request.config),
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    role: ContentRole,
    parts: Vec<TextPart>,
}

impl Content {
    fn text(role: ContentRole, text: &str) -> Self {
        Self {
            role,
            parts: vec![TextPart {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<TextPart>,
}

impl SystemInstruction {
    fn new(text: &str) -> Self {
        Self {
            parts: vec![TextPart {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl WireGenerationConfig {
    fn from_config(config: &GenerationConfig) -> Option<Self> {
        if config.response_mime_type.is_none()
            && config.max_output_tokens.is_none()
            && config.temperature.is_none()
        {
            return None;
        }
        Some(Self {
            response_mime_type: config.response_mime_type.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[ResponsePart] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.first_parts()
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect()
    }

    fn images(&self) -> Vec<InlineImage> {
        self.first_parts()
            .iter()
            .filter_map(|part| part.inline_data.as_ref())
            .map(|data| InlineImage {
                mime_type: data.mime_type.clone(),
                data: data.data.clone(),
            })
            .collect()
    }

    fn usage(&self) -> TokenUsage {
        self.usage_metadata
            .as_ref()
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default()
    }
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

fn parse_retry_after(value: Option<&HeaderValue>) -> Option<u64> {
    value?.to_str().ok()?.trim().parse().ok()
}

fn map_http_error(status: StatusCode, body: &str, retry_after: Option<u64>) -> LlmError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return LlmError::RateLimited {
            retry_after_secs: retry_after,
        };
    }

    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            match wrapper.error.status {
                Some(status_text) if !status_text.is_empty() => format!("{status_text}: {msg}"),
                _ => msg,
            }
        })
        .unwrap_or_else(|_| body.to_string());

    LlmError::Api {
        status: status.as_u16(),
        message,
    }
}
