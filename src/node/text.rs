//! Text node type
//!
//! Text runs in the document tree. A run occupies one offset unit per
//! character.

use crate::attr::Attrs;

// =============================================================================
// Text
// =============================================================================

/// Text run with optional formatting attributes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Text {
    /// Text content
    pub data: String,
    /// Formatting attributes (`bold`, ...)
    pub attrs: Attrs,
}

impl Text {
    /// Create a new plain text run
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            attrs: Vec::new(),
        }
    }

    /// Check if text content is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Offset size in characters
    pub fn len(&self) -> usize {
        self.data.chars().count()
    }

    /// Check if text is only whitespace (an empty run counts as whitespace)
    pub fn is_whitespace(&self) -> bool {
        self.data.chars().all(char::is_whitespace)
    }

    /// Maximal whitespace prefix of the run
    pub fn leading_whitespace(&self) -> &str {
        leading_whitespace(&self.data)
    }

    /// Split the run at a character offset, keeping the head and returning the tail
    pub fn split_off(&mut self, at: usize) -> Text {
        let byte = char_to_byte(&self.data, at);
        Text {
            data: self.data.split_off(byte),
            attrs: self.attrs.clone(),
        }
    }
}

/// Maximal prefix of `text` made of whitespace characters
pub fn leading_whitespace(text: &str) -> &str {
    let end = text
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(text.len(), |(i, _)| i);
    &text[..end]
}

/// Byte index of a character offset (clamped to the end)
fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices().nth(offset).map_or(text.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_node() {
        let text = Text::new("  hello world  ");
        assert!(!text.is_empty());
        assert!(!text.is_whitespace());
        assert_eq!(text.leading_whitespace(), "  ");
        assert_eq!(text.len(), 15);
    }

    #[test]
    fn test_whitespace_only() {
        assert!(Text::new(" \t ").is_whitespace());
        assert_eq!(leading_whitespace("\t\t"), "\t\t");
        assert_eq!(leading_whitespace("x "), "");
    }

    #[test]
    fn test_split_off_multibyte() {
        let mut text = Text::new("héllo");
        let tail = text.split_off(2);
        assert_eq!(text.data, "hé");
        assert_eq!(tail.data, "llo");
    }
}
