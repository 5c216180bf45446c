//! Keyword classification of user messages.

use serde::{Deserialize, Serialize};

const IMAGE_PREFIXES: [&str; 3] = ["generate image", "create an image", "draw"];
const DICTIONARY_PREFIX: &str = "define ";
const DICTIONARY_PHRASE: &str = "definition of";

/// What a user message is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Image synthesis.
    Image,
    /// Dictionary lookup.
    Dictionary,
    /// Anything else.
    Conversation,
}

/// Classifies a raw user message.
///
/// Rules are checked in order on the lower-cased message and the first match
/// wins, so a message that looks like both an image request and a dictionary
/// lookup is an image request.
#[must_use]
pub fn classify(message: &str) -> Intent {
    let lower = message.to_lowercase();

    if IMAGE_PREFIXES.iter().any(|prefix| lower.starts_with(prefix)) {
        Intent::Image
    } else if lower.starts_with(DICTIONARY_PREFIX) || lower.contains(DICTIONARY_PHRASE) {
        Intent::Dictionary
    } else {
        Intent::Conversation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_prefixes_any_case() {
        for message in [
            "draw a cat",
            "Draw me a map",
            "GENERATE IMAGE of a sunset",
            "generate images of dogs",
            "Create an image of a lighthouse",
            "drawing tips",
        ] {
            assert_eq!(classify(message), Intent::Image, "{message}");
        }
    }

    #[test]
    fn dictionary_forms() {
        assert_eq!(classify("define serendipity"), Intent::Dictionary);
        assert_eq!(classify("Define ephemeral"), Intent::Dictionary);
        assert_eq!(
            classify("what is the Definition of entropy?"),
            Intent::Dictionary
        );
    }

    #[test]
    fn define_requires_trailing_space() {
        assert_eq!(classify("defined benefits"), Intent::Conversation);
        assert_eq!(classify("define"), Intent::Conversation);
    }

    #[test]
    fn image_wins_over_dictionary() {
        assert_eq!(
            classify("draw the definition of love"),
            Intent::Image
        );
    }

    #[test]
    fn prefix_must_be_at_start() {
        assert_eq!(classify("please draw a cat"), Intent::Conversation);
        assert_eq!(classify(" draw a cat"), Intent::Conversation);
    }

    #[test]
    fn everything_else_is_conversation() {
        assert_eq!(classify(""), Intent::Conversation);
        assert_eq!(classify("Explain quantum entanglement"), Intent::Conversation);
    }
}
