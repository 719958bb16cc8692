//! # EmberMCP Server
//!
//! An embeddable MCP (Model Context Protocol) server. The embedding program
//! registers its tools and resources through the [`ServerBuilder`], then
//! hands control to a run loop over stdio or HTTP:
//!
//! ```no_run
//! use embermcp_server::{ServerBuilder, ToolError};
//! use embermcp_protocol::types::ToolInputSchema;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = ServerBuilder::new()
//!         .name("calculator")
//!         .version("1.0.0")
//!         .tool_fn("add", "Add two numbers", ToolInputSchema::default(), |args| {
//!             let a = args.get("a").and_then(|v| v.as_i64()).unwrap_or(0);
//!             let b = args.get("b").and_then(|v| v.as_i64()).unwrap_or(0);
//!             Ok(json!(a + b))
//!         })
//!         .build()?;
//!
//!     server.run_stdio().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`session`] - refcounted sessions behind a readers/writer live set,
//!   with bounded capacity and a periodic reaper
//! - [`registry`] - tool and resource registries with per-entry statistics
//! - [`routing`] - the dispatcher gluing the codec, the lifecycle state
//!   machine, and the registries together
//! - [`server`] - builder, assembled server, run loops, graceful shutdown
//! - [`clock`] - the injectable time capability
//!
//! Tool failures are deliberately not JSON-RPC errors: the registry wraps
//! them into the MCP content envelope with `isError: true` and the JSON-RPC
//! response stays a success. Carrier failures surface through logs and the
//! run loop's return value.

#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(clippy::all)]

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod registry;
pub mod routing;
pub mod server;
pub mod session;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::{
    LimitsConfig, LogOutput, LogRotation, LoggingConfig, ServerConfig, SessionConfig,
};
pub use error::{ServerError, ServerResult, ToolError};
pub use logging::LoggingGuard;
pub use registry::{
    FnTool, ResourceRegistry, ResourceValue, SafeFileHandler, TemplateHandler, ToolExecutor,
    ToolLimits, ToolMetadata, ToolRegistry, ToolStats,
};
pub use routing::RequestDispatcher;
pub use server::{McpServer, ServerBuilder, ShutdownHandle};
pub use session::{Session, SessionManager, SessionState};

// Re-export the protocol vocabulary embedders touch most.
pub use embermcp_protocol::types::{Tool, ToolInputSchema};
pub use embermcp_protocol::{MAX_MESSAGE_SIZE, PROTOCOL_VERSION};

/// Create a new server builder
pub fn server() -> ServerBuilder {
    ServerBuilder::new()
}

/// Prelude for embedders
pub mod prelude {
    pub use crate::{
        FnTool, LoggingConfig, McpServer, SafeFileHandler, ServerBuilder, ServerConfig,
        ServerError, ServerResult, SessionConfig, ShutdownHandle, Tool, ToolError, ToolExecutor,
        ToolInputSchema, server,
    };
}
