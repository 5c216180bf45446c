//! The normalized output of a model call.

use serde::{Deserialize, Serialize};

/// How a piece of content should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Prose, possibly with fenced code blocks.
    Text,
    /// A generated image.
    Image,
    /// Structured JSON output.
    Json,
    /// Source code.
    Code,
}

impl ContentKind {
    /// Returns the wire name of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Json => "json",
            Self::Code => "code",
        }
    }
}

/// Result of a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceResult {
    /// Text to show; for failures, a fixed apology.
    pub text: String,
    /// How to render `text`.
    #[serde(rename = "type")]
    pub kind: ContentKind,
    /// Data URI of a generated image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl InferenceResult {
    /// Creates a plain text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ContentKind::Text,
            image_url: None,
        }
    }

    /// Creates a JSON result.
    #[must_use]
    pub fn json(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ContentKind::Json,
            image_url: None,
        }
    }

    /// Creates a result of the given kind.
    #[must_use]
    pub fn of_kind(text: impl Into<String>, kind: ContentKind) -> Self {
        Self {
            text: text.into(),
            kind,
            image_url: None,
        }
    }

    /// Creates an image result.
    #[must_use]
    pub fn image(text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ContentKind::Image,
            image_url: Some(image_url.into()),
        }
    }
}
