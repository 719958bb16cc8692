//! Tool and resource registries
//!
//! Both registries follow the same concurrency shape: a readers/writer lock
//! over the membership table (lookups shared, registration exclusive),
//! `Arc`-counted entries so lookups escape the lock, and per-entry mutexes
//! for the mutable statistics. Registration happens during server
//! construction and the tables are stable once the run loop starts.

pub mod resources;
pub mod tools;

pub use resources::{ResourceRegistry, ResourceValue, SafeFileHandler, TemplateHandler};
pub use tools::{FnTool, ToolExecutor, ToolLimits, ToolMetadata, ToolRegistry, ToolStats};

/// Validate a registry entry name: 1-255 characters drawn from
/// `[A-Za-z0-9_-]`.
pub(crate) fn validate_entry_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 255 {
        return false;
    }
    name.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
