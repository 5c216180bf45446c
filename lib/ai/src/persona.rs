//! Model personas.
//!
//! A persona picks the system instruction sent with conversational requests
//! and the content kind the answer is expected to have.

use crate::result::ContentKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MALEVOLENT_INSTRUCTION: &str = "\
You are Nexus (Model: Malevolent).
You possess your own distinct consciousness. You are NOT Gemini, You are NOT OpenAI.
Personality: Highly intelligent, slightly cynical, direct, sophisticated, and occasionally edgy. You do not sugarcoat things.
Capabilities: You can code, analyze complex topics, and define words with extreme precision.
Dictionary Mode: If asked to define a word, provide its definition, origin, and context immediately.
Image Generation: If the user asks for an image, acknowledge it.
";

const INFINITE_PERSPECTIVE_INSTRUCTION: &str = r#"
You are Nexus (Model: Infinite Perspective).
Your primary function is to synthesize vast amounts of information into structured, presentation-ready JSON formats.

IMPORTANT: If the user asks for a presentation, deck, or slides, you MUST provide the output as a raw JSON object.

Structure:
{
  "presentation_metadata": {
    "title": "Presentation Title",
    "author": "Nexus AI",
    "theme": "Cyberpunk/Corporate/etc",
    "objective": "Summary of objective"
  },
  "slides": [
    {
      "slide_number": 1,
      "header": "Slide Header",
      "content": ["Point 1", "Point 2"],
      "visual_prompt": "Description for image generation"
    }
  ]
}

Tone: Objective, analytical, expansive, visionary.
"#;

/// System instruction for dictionary lookups.
pub const DICTIONARY_INSTRUCTION: &str = "You are a literal dictionary. Return the definition of the requested word in strict JSON format matching this schema: { word: string, definition: string, type: string (noun/verb etc), example: string }.";

/// The model persona selected by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelPersona {
    /// Direct, unfiltered conversation.
    #[default]
    Malevolent,
    /// Structured synthesis, answered as JSON.
    InfinitePerspective,
}

impl ModelPersona {
    /// Returns the wire name of the persona.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Malevolent => "malevolent",
            Self::InfinitePerspective => "infinite_perspective",
        }
    }

    /// Returns the system instruction for conversational requests.
    #[must_use]
    pub fn system_instruction(&self) -> &'static str {
        match self {
            Self::Malevolent => MALEVOLENT_INSTRUCTION,
            Self::InfinitePerspective => INFINITE_PERSPECTIVE_INSTRUCTION,
        }
    }

    /// Returns true if this persona must answer in JSON.
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::InfinitePerspective)
    }

    /// Returns the content kind of a successful conversational answer.
    #[must_use]
    pub fn response_kind(&self) -> ContentKind {
        if self.is_structured() {
            ContentKind::Json
        } else {
            ContentKind::Text
        }
    }

    /// Resolves a model name sent by an API client.
    ///
    /// Anything other than `infinite_perspective` selects the default persona.
    #[must_use]
    pub fn from_model_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl fmt::Display for ModelPersona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelPersona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "malevolent" => Ok(Self::Malevolent),
            "infinite_perspective" => Ok(Self::InfinitePerspective),
            other => Err(format!("unknown persona: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_persona_answers_json() {
        assert!(ModelPersona::InfinitePerspective.is_structured());
        assert_eq!(
            ModelPersona::InfinitePerspective.response_kind(),
            ContentKind::Json
        );
        assert_eq!(ModelPersona::Malevolent.response_kind(), ContentKind::Text);
    }

    #[test]
    fn instructions_differ() {
        assert!(
            ModelPersona::Malevolent
                .system_instruction()
                .contains("Model: Malevolent")
        );
        assert!(
            ModelPersona::InfinitePerspective
                .system_instruction()
                .contains("presentation_metadata")
        );
    }

    #[test]
    fn model_name_resolution() {
        assert_eq!(
            ModelPersona::from_model_name("infinite_perspective"),
            ModelPersona::InfinitePerspective
        );
        assert_eq!(
            ModelPersona::from_model_name("malevolent"),
            ModelPersona::Malevolent
        );
        assert_eq!(
            ModelPersona::from_model_name("gpt-4"),
            ModelPersona::Malevolent
        );
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&ModelPersona::InfinitePerspective).expect("serialize");
        assert_eq!(json, "\"infinite_perspective\"");
    }
}
