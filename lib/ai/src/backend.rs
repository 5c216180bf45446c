//! Inference backend abstraction.
//!
//! The dispatcher talks to the hosted model API only through
//! [`InferenceBackend`], so tests can substitute a scripted double.

use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// MIME type requested when structured JSON output is wanted.
pub const JSON_MIME_TYPE: &str = "application/json";

/// Who produced a turn of conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    /// The human side of the exchange.
    User,
    /// The model side of the exchange.
    Model,
}

/// A prior turn sent along with a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: ContentRole,
    pub text: String,
}

impl HistoryTurn {
    /// Creates a user turn.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ContentRole::User,
            text: text.into(),
        }
    }

    /// Creates a model turn.
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ContentRole::Model,
            text: text.into(),
        }
    }
}

/// Generation settings recognised by nexus.
///
/// Every field is optional. [`GenerationConfig::merge`] layers one config on
/// top of another field by field, the overriding side winning whenever it
/// sets a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// System instruction sent ahead of the conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
    /// Requested output MIME type (e.g. `application/json`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    /// Upper bound on generated tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GenerationConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the system instruction.
    #[must_use]
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Sets the response MIME type.
    #[must_use]
    pub fn with_response_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.response_mime_type = Some(mime_type.into());
        self
    }

    /// Requests JSON output.
    #[must_use]
    pub fn with_json_output(self) -> Self {
        self.with_response_mime_type(JSON_MIME_TYPE)
    }

    /// Sets the maximum number of output tokens.
    #[must_use]
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Layers `overrides` on top of `self`.
    #[must_use]
    pub fn merge(self, overrides: &GenerationConfig) -> Self {
        Self {
            system_instruction: overrides
                .system_instruction
                .clone()
                .or(self.system_instruction),
            response_mime_type: overrides
                .response_mime_type
                .clone()
                .or(self.response_mime_type),
            max_output_tokens: overrides.max_output_tokens.or(self.max_output_tokens),
            temperature: overrides.temperature.or(self.temperature),
        }
    }

    /// Returns true if JSON output is requested.
    #[must_use]
    pub fn wants_json(&self) -> bool {
        self.response_mime_type.as_deref() == Some(JSON_MIME_TYPE)
    }

    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A text generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRequest {
    /// Model identifier.
    pub model: String,
    /// The new message.
    pub prompt: String,
    /// Prior turns; empty for a single-shot request.
    pub history: Vec<HistoryTurn>,
    /// Generation settings.
    pub config: GenerationConfig,
}

impl TextRequest {
    /// Creates a single-shot request with no history.
    #[must_use]
    pub fn single_shot(
        model: impl Into<String>,
        prompt: impl Into<String>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            history: Vec::new(),
            config,
        }
    }

    /// Creates a chat request seeded with prior turns.
    #[must_use]
    pub fn chat(
        model: impl Into<String>,
        history: Vec<HistoryTurn>,
        prompt: impl Into<String>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            history,
            config,
        }
    }

    /// Returns true if this request continues an exchange.
    #[must_use]
    pub fn is_chat(&self) -> bool {
        !self.history.is_empty()
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens.
    pub input_tokens: u32,
    /// Number of output tokens.
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Returns the total number of tokens.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// A text generation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextResponse {
    /// Generated text; empty when the backend returned none.
    pub text: String,
    /// Token usage statistics.
    pub usage: TokenUsage,
    /// Model that generated the response.
    pub model: String,
}

/// An image generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
}

impl ImageRequest {
    #[must_use]
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
        }
    }
}

/// Inline binary image data returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
    /// Base64-encoded payload.
    pub data: String,
}

impl InlineImage {
    /// Formats the image as a `data:` URI.
    #[must_use]
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// An image generation response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResponse {
    /// Inline images, in the order the backend returned them.
    pub images: Vec<InlineImage>,
    /// Any accompanying text.
    pub text: Option<String>,
}

impl ImageResponse {
    /// Returns the first image, if any.
    #[must_use]
    pub fn first_image(&self) -> Option<&InlineImage> {
        self.images.first()
    }
}

/// Trait for inference backends.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Generates text, either single-shot or continuing `request.history`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    async fn generate_text(&self, request: &TextRequest) -> Result<TextResponse, LlmError>;

    /// Generates an image from a prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    async fn generate_image(&self, request: &ImageRequest) -> Result<ImageResponse, LlmError>;

    /// Returns the provider name, for logging.
    fn provider(&self) -> &str;
}
