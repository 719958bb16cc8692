//! Resource listings and the `resources/*` request/result shapes

use serde::{Deserialize, Serialize};

/// A resource as listed to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource URI, unique within the registry
    pub uri: String,
    /// Resource name
    pub name: String,
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME type of the content
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

/// A URI-template resource family as listed to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTemplate {
    /// The URI pattern with a single `{param}` placeholder at the tail
    #[serde(rename = "uriTemplate")]
    pub uri_template: String,
    /// Template name
    pub name: String,
    /// Optional display title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME type of generated contents, when uniform
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// `resources/read` parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResourceRequest {
    /// URI to read
    pub uri: String,
}

/// One entry of a `resources/read` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceContents {
    /// The URI that was read
    pub uri: String,
    /// MIME type of the content
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Text content (binary data is represented by a placeholder note)
    pub text: String,
}

/// `resources/read` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResourceResult {
    /// The content entries for the requested URI
    pub contents: Vec<ResourceContents>,
}

/// `resources/list` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResourcesResult {
    /// Registered resources, in a stable order
    pub resources: Vec<Resource>,
}

/// `resources/templates/list` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResourceTemplatesResult {
    /// Registered templates, in registration order
    #[serde(rename = "resourceTemplates")]
    pub resource_templates: Vec<ResourceTemplate>,
}
