//! # EmberMCP Transport
//!
//! Carrier implementations for the EmberMCP server. A carrier moves raw
//! message bytes between a client and a [`MessageHandler`]; it knows nothing
//! about JSON-RPC beyond "one message in, maybe one reply out".
//!
//! Two carriers are provided:
//!
//! - [`StdioCarrier`] - newline-delimited JSON over stdin/stdout, the
//!   single-connection carrier used when the server is spawned by an agent
//!   host.
//! - [`HttpCarrier`] - an axum `POST` endpoint where each request is its own
//!   short-lived connection. Notifications (no reply) are answered with
//!   `202 Accepted`; session identifiers travel in the `Mcp-Session-Id`
//!   header.
//!
//! Both carriers stop promptly when the shutdown watch channel flips.

#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(clippy::all)]

pub mod http;
pub mod stdio;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use embermcp_protocol::MessageHandler;

pub use http::{HttpCarrier, HttpCarrierConfig};
pub use stdio::StdioCarrier;

/// HTTP header carrying the session identifier
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Result type for carrier operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Carrier-level failures.
///
/// These are surfaced to the embedder and logged; they never synthesize an
/// on-wire response (there is nobody to reply to).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransportError {
    /// Underlying I/O failure
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Framing or codec failure on the byte stream
    #[error("transport codec error: {0}")]
    Codec(String),

    /// The listener could not be established
    #[error("transport bind error: {0}")]
    Bind(String),
}

/// A byte-level carrier between clients and the dispatcher.
///
/// `serve` runs the carrier's accept/read loop until end-of-input or until
/// the shutdown channel flips, delivering each inbound message to the
/// handler and emitting its reply.
#[async_trait]
pub trait Carrier: Send + Sync {
    /// Run the carrier until shutdown
    async fn serve(
        &self,
        handler: Arc<dyn MessageHandler>,
        shutdown: watch::Receiver<bool>,
    ) -> TransportResult<()>;
}
