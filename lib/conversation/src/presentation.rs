//! Slide deck payloads produced by the structured persona.
//!
//! Model output is loosely shaped, so every field tolerates absence and a
//! deck wrapped in a one-element array is treated as the deck itself.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Key whose presence marks a JSON object as a slide deck.
pub const METADATA_KEY: &str = "presentation_metadata";

/// A slide deck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationData {
    #[serde(default, deserialize_with = "lenient_metadata")]
    pub presentation_metadata: PresentationMetadata,
    #[serde(default, deserialize_with = "lenient_slides")]
    pub slides: Vec<Slide>,
}

/// Deck-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationMetadata {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub theme: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub objective: Option<String>,
}

/// One slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    #[serde(default, deserialize_with = "lenient_number")]
    pub slide_number: Option<u32>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub header: Option<String>,
    #[serde(default, deserialize_with = "lenient_lines")]
    pub content: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub visual_prompt: Option<String>,
}

impl PresentationData {
    /// Interprets a JSON value as a deck.
    ///
    /// Returns `None` unless the (unwrapped) value is an object with a truthy
    /// `presentation_metadata`. Mistyped fields inside the deck degrade to
    /// their empty values instead of discarding it.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let value = unwrap_single(value);
        if !value.get(METADATA_KEY).is_some_and(is_truthy) {
            return None;
        }
        Self::deserialize(value).ok()
    }

    /// Deck title, if the model supplied one.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.presentation_metadata.title.as_deref()
    }
}

/// Returns the only element of a one-element array, or `value` itself.
#[must_use]
pub fn unwrap_single(value: &Value) -> &Value {
    match value {
        Value::Array(items) if items.len() == 1 => &items[0],
        other => other,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_lines<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        Value::String(s) if !s.is_empty() => vec![s],
        _ => Vec::new(),
    })
}

fn lenient_slides<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Slide>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| Slide::deserialize(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_metadata<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<PresentationMetadata, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(PresentationMetadata::default());
    }
    Ok(PresentationMetadata::deserialize(value).unwrap_or_default())
}
