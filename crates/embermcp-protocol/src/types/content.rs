//! Message content blocks
//!
//! The tool-result envelope carries an array of typed content blocks. The
//! core emits text blocks only; binary resource data is represented by a
//! placeholder text block until a binary-aware encoding lands.

use serde::{Deserialize, Serialize};

/// Content block union, tagged by `type` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// Text content
    #[serde(rename = "text")]
    Text(TextContent),
}

impl ContentBlock {
    /// Build a text block
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextContent { text: text.into() })
    }

    /// The text of this block, if it is a text block
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(&t.text),
        }
    }
}

/// Plain text content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    /// The text of the block
    pub text: String,
}
