//! Turns message content into view structures.
//!
//! The output is a typed description of what to show; painting it is the
//! client's job. Nothing in here fails: malformed model output degrades to a
//! plainer view.

use crate::message::Message;
use crate::presentation::PresentationData;
use nexus_ai::{ContentKind, InferenceResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Label shown on a code block without a language tag.
pub const DEFAULT_CODE_LABEL: &str = "code";
/// Label shown on JSON that is not a slide deck.
pub const STRUCTURED_OUTPUT_LABEL: &str = "structured output";

static FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"```(\w*)\n([\s\S]*?)```").ok());

/// A piece of text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "segment", rename_all = "snake_case")]
pub enum TextSegment {
    /// Prose outside any fence.
    Paragraph { text: String },
    /// A fenced code block.
    Code { language: String, code: String },
}

impl TextSegment {
    fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph { text: text.into() }
    }
}

/// Displayable form of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum RenderedContent {
    /// Prose with embedded code blocks.
    Text { segments: Vec<TextSegment> },
    /// Slide deck preview plus the raw JSON for copying.
    Presentation { deck: PresentationData, raw: String },
    /// JSON that is not a deck, or not JSON at all.
    StructuredFallback { label: String, raw: String },
    /// A generated image.
    Image {
        image_url: String,
        caption: String,
        xml: String,
    },
}

/// Renders content of the given kind.
///
/// `image_url` is only consulted for images; an image message without one
/// renders as text.
#[must_use]
pub fn render(content: &str, kind: ContentKind, image_url: Option<&str>) -> RenderedContent {
    match kind {
        ContentKind::Json => render_json(content),
        ContentKind::Image => match image_url {
            Some(url) => render_image(content, url),
            None => render_text(content),
        },
        ContentKind::Text | ContentKind::Code => render_text(content),
    }
}

/// Renders a transcript message.
#[must_use]
pub fn render_message(message: &Message) -> RenderedContent {
    render(&message.content, message.kind, message.image_url.as_deref())
}

/// Renders a dispatch result.
#[must_use]
pub fn render_result(result: &InferenceResult) -> RenderedContent {
    render(&result.text, result.kind, result.image_url.as_deref())
}

/// Splits text on fenced code blocks.
#[must_use]
pub fn split_segments(text: &str) -> Vec<TextSegment> {
    let Some(fence) = FENCE.as_ref().filter(|fence| fence.is_match(text)) else {
        return vec![TextSegment::paragraph(text)];
    };

    let mut segments = Vec::new();
    let mut cursor = 0;

    for captures in fence.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        push_paragraph(&mut segments, &text[cursor..whole.start()]);

        let language = captures
            .get(1)
            .map(|m| m.as_str())
            .filter(|lang| !lang.is_empty())
            .unwrap_or(DEFAULT_CODE_LABEL);
        let code = captures.get(2).map_or("", |m| m.as_str());
        segments.push(TextSegment::Code {
            language: language.to_string(),
            code: code.trim().to_string(),
        });

        cursor = whole.end();
    }
    push_paragraph(&mut segments, &text[cursor..]);

    segments
}

fn push_paragraph(segments: &mut Vec<TextSegment>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        segments.push(TextSegment::paragraph(text));
    }
}

fn render_text(content: &str) -> RenderedContent {
    RenderedContent::Text {
        segments: split_segments(content),
    }
}

fn render_json(content: &str) -> RenderedContent {
    let deck = serde_json::from_str::<serde_json::Value>(content)
        .ok()
        .and_then(|value| PresentationData::from_value(&value));

    match deck {
        Some(deck) => RenderedContent::Presentation {
            deck,
            raw: content.to_string(),
        },
        None => RenderedContent::StructuredFallback {
            label: STRUCTURED_OUTPUT_LABEL.to_string(),
            raw: content.to_string(),
        },
    }
}

fn render_image(caption: &str, image_url: &str) -> RenderedContent {
    RenderedContent::Image {
        image_url: image_url.to_string(),
        caption: caption.to_string(),
        xml: image_xml(image_url),
    }
}

/// XML snippet referencing an image, for copy-to-clipboard.
#[must_use]
pub fn image_xml(image_url: &str) -> String {
    let escaped = image_url
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!("<image><url>{escaped}</url></image>")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(language: &str, body: &str) -> TextSegment {
        TextSegment::Code {
            language: language.to_string(),
            code: body.to_string(),
        }
    }

    #[test]
    fn one_fenced_block_yields_three_segments() {
        let rendered = render("before\n```js\ncode()\n```\nafter", ContentKind::Text, None);

        assert_eq!(
            rendered,
            RenderedContent::Text {
                segments: vec![
                    TextSegment::paragraph("before"),
                    code("js", "code()"),
                    TextSegment::paragraph("after"),
                ]
            }
        );
    }

    #[test]
    fn no_fence_is_one_paragraph() {
        let text = "  just words\n\nand more  ";
        assert_eq!(split_segments(text), vec![TextSegment::paragraph(text)]);
    }

    #[test]
    fn untagged_fence_gets_default_label() {
        let segments = split_segments("```\nls -la\n```");
        assert_eq!(segments, vec![code("code", "ls -la")]);
    }

    #[test]
    fn several_blocks_in_order() {
        let segments = split_segments(
            "Setup:\n```sh\ncargo new x\n```\nThen:\n```rust\nfn main() {}\n```",
        );
        assert_eq!(
            segments,
            vec![
                TextSegment::paragraph("Setup:"),
                code("sh", "cargo new x"),
                TextSegment::paragraph("Then:"),
                code("rust", "fn main() {}"),
            ]
        );
    }

    #[test]
    fn unterminated_fence_stays_text() {
        let text = "look\n```py\nprint(1)";
        assert_eq!(split_segments(text), vec![TextSegment::paragraph(text)]);
    }

    #[test]
    fn code_kind_renders_like_text() {
        assert_eq!(
            render("x = 1", ContentKind::Code, None),
            render("x = 1", ContentKind::Text, None)
        );
    }

    #[test]
    fn presentation_preview() {
        let raw = r#"{"presentation_metadata":{"title":"T"},"slides":[]}"#;
        match render(raw, ContentKind::Json, None) {
            RenderedContent::Presentation { deck, raw: copy } => {
                assert_eq!(deck.title(), Some("T"));
                assert!(deck.slides.is_empty());
                assert_eq!(copy, raw);
            }
            other => panic!("expected presentation, got {other:?}"),
        }
    }

    #[test]
    fn presentation_in_single_element_array() {
        let raw = r#"[{"presentation_metadata":{"title":"Bees"},"slides":[{"slide_number":1,"header":"Hive","content":["wax"]}]}]"#;
        let RenderedContent::Presentation { deck, .. } = render(raw, ContentKind::Json, None)
        else {
            panic!("expected presentation");
        };
        assert_eq!(deck.slides.len(), 1);
    }

    #[test]
    fn invalid_json_falls_back() {
        assert_eq!(
            render("not json", ContentKind::Json, None),
            RenderedContent::StructuredFallback {
                label: "structured output".to_string(),
                raw: "not json".to_string(),
            }
        );
    }

    #[test]
    fn plain_json_falls_back() {
        let raw = r#"{"word":"tide","definition":"rise and fall of the sea"}"#;
        assert!(matches!(
            render(raw, ContentKind::Json, None),
            RenderedContent::StructuredFallback { .. }
        ));
    }

    #[test]
    fn image_view_carries_xml() {
        let rendered = render(
            "Visual synthesis complete.",
            ContentKind::Image,
            Some("data:image/png;base64,AAAA"),
        );
        assert_eq!(
            rendered,
            RenderedContent::Image {
                image_url: "data:image/png;base64,AAAA".to_string(),
                caption: "Visual synthesis complete.".to_string(),
                xml: "<image><url>data:image/png;base64,AAAA</url></image>".to_string(),
            }
        );
    }

    #[test]
    fn image_without_url_is_text() {
        assert!(matches!(
            render("no picture", ContentKind::Image, None),
            RenderedContent::Text { .. }
        ));
    }

    #[test]
    fn xml_escapes_markup() {
        assert_eq!(
            image_xml("https://x.test/a?b=1&c=<2>"),
            "<image><url>https://x.test/a?b=1&amp;c=&lt;2&gt;</url></image>"
        );
    }
}
