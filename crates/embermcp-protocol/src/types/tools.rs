//! Tool definitions and the `tools/*` request/result shapes

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::content::ContentBlock;

/// JSON-schema description of a tool's expected arguments.
///
/// Only the type-tag level is interpreted by the registry's argument
/// checker; deeper schema facets ride along in `extra` and are passed
/// through to clients verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInputSchema {
    /// Schema type, `"object"` for argument maps
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Per-argument schemas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, Value>>,
    /// Names of required arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Uninterpreted schema facets
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Default for ToolInputSchema {
    fn default() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: None,
            required: None,
            extra: HashMap::new(),
        }
    }
}

impl ToolInputSchema {
    /// An object schema with the given properties and required names
    pub fn object(properties: HashMap<String, Value>, required: Vec<String>) -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: if required.is_empty() {
                None
            } else {
                Some(required)
            },
            extra: HashMap::new(),
        }
    }
}

/// A tool definition as listed to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (programmatic identifier)
    pub name: String,
    /// Display title, omitted when it would repeat the name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Human-readable description
    pub description: String,
    /// Expected argument schema
    #[serde(rename = "inputSchema")]
    pub input_schema: ToolInputSchema,
    /// Optional schema for `structuredContent` in results
    #[serde(rename = "outputSchema", skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
}

impl Tool {
    /// Create a tool definition
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: ToolInputSchema,
    ) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: description.into(),
            input_schema,
            output_schema: None,
        }
    }

    /// Set the display title. A title equal to the name is dropped so it is
    /// not duplicated on the wire.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.title = if title == self.name { None } else { Some(title) };
        self
    }
}

/// `tools/call` parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolRequest {
    /// Tool name
    pub name: String,
    /// Tool arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<HashMap<String, Value>>,
}

/// `tools/call` result: the MCP content envelope.
///
/// Application-level tool failures live here behind `isError: true`; they
/// are NOT JSON-RPC errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolResult {
    /// Result content blocks
    pub content: Vec<ContentBlock>,
    /// Structured form of the result, when available
    #[serde(rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    /// Whether the call failed at the application level
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl CallToolResult {
    /// A success envelope: stringified text block plus the structured value
    pub fn success(value: Value) -> Self {
        let text = serde_json::to_string(&value).unwrap_or_else(|_| "null".to_string());
        Self {
            content: vec![ContentBlock::text(text)],
            structured_content: Some(value),
            is_error: false,
        }
    }

    /// A failure envelope: `"Error (<kind>): <message>"` text block
    pub fn failure(kind: &str, message: &str, details: Option<Value>) -> Self {
        Self {
            content: vec![ContentBlock::text(format!("Error ({kind}): {message}"))],
            structured_content: details,
            is_error: true,
        }
    }
}

/// `tools/list` result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListToolsResult {
    /// Tool definitions, in a stable order
    pub tools: Vec<Tool>,
}
