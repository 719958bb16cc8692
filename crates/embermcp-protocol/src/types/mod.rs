//! MCP wire vocabulary
//!
//! Serde types for the protocol methods this server implements. Optional
//! fields use `skip_serializing_if` so they are omitted from the wire
//! rather than emitted as `null`.

mod capabilities;
mod content;
mod core;
mod initialization;
mod resources;
mod tools;

pub use capabilities::{
    ClientCapabilities, LoggingCapability, PromptsCapability, ResourcesCapability,
    RootsCapability, SamplingCapability, ServerCapabilities, ToolsCapability,
};
pub use content::{ContentBlock, TextContent};
pub use core::{EmptyResult, Implementation};
pub use initialization::{InitializeRequest, InitializeResult};
pub use resources::{
    ListResourceTemplatesResult, ListResourcesResult, ReadResourceRequest, ReadResourceResult,
    Resource, ResourceContents, ResourceTemplate,
};
pub use tools::{CallToolRequest, CallToolResult, ListToolsResult, Tool, ToolInputSchema};
