//! Shared wire primitives

use serde::{Deserialize, Serialize};

/// Name and version of an MCP implementation, exchanged during initialize
/// as `clientInfo` / `serverInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    /// Programmatic name
    pub name: String,
    /// Display title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Version string
    pub version: String,
}

impl Implementation {
    /// Create an implementation descriptor
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            version: version.into(),
        }
    }
}

/// The empty object result some methods return (`ping`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyResult {}
