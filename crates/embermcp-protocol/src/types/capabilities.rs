//! Capability negotiation types
//!
//! Two parallel sets: server capabilities (tools / resources / prompts /
//! logging) advertised from `initialize`, and client capabilities (roots /
//! sampling) declared by the client. Each side's effective set is the
//! OR-merge of declared and discovered capabilities.

use serde::{Deserialize, Serialize};

/// Capabilities a client declares during initialize
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCapabilities {
    /// Filesystem roots support
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roots: Option<RootsCapability>,
    /// LLM sampling support
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling: Option<SamplingCapability>,
}

impl ClientCapabilities {
    /// OR-merge another declaration into this set
    pub fn merge(&mut self, other: &ClientCapabilities) {
        if other.roots.is_some() {
            self.roots = other.roots.clone();
        }
        if other.sampling.is_some() {
            self.sampling = other.sampling.clone();
        }
    }
}

/// Roots capability details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootsCapability {
    /// Whether the client notifies on root list changes
    #[serde(rename = "listChanged", skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Sampling capability marker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingCapability {}

/// Capabilities a server advertises from initialize
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// Tool invocation support
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
    /// Resource reading support
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesCapability>,
    /// Prompt support (never advertised by this server)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts: Option<PromptsCapability>,
    /// Logging support (always advertised)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingCapability>,
}

impl ServerCapabilities {
    /// Compute the advertised set from the live registries: tools and
    /// resources appear iff something is registered, logging always does.
    pub fn from_registrations(has_tools: bool, has_resources: bool) -> Self {
        Self {
            tools: has_tools.then(ToolsCapability::default),
            resources: has_resources.then(ResourcesCapability::default),
            prompts: None,
            logging: Some(LoggingCapability {}),
        }
    }
}

/// Tools capability details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsCapability {
    /// Whether the server notifies on tool list changes
    #[serde(rename = "listChanged", skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Resources capability details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcesCapability {
    /// Whether resource subscriptions are supported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribe: Option<bool>,
    /// Whether the server notifies on resource list changes
    #[serde(rename = "listChanged", skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Prompts capability details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptsCapability {
    /// Whether the server notifies on prompt list changes
    #[serde(rename = "listChanged", skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Logging capability marker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingCapability {}
