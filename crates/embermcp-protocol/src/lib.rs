//! # EmberMCP Protocol
//!
//! Protocol layer for the EmberMCP embeddable MCP server: JSON-RPC 2.0
//! message codec, MCP wire types, and the protocol lifecycle state machine.
//!
//! This crate is deliberately small and transport-agnostic. It knows how to
//! parse, validate, classify, and emit JSON-RPC envelopes; it knows which
//! lifecycle phase the protocol is in and which transitions are legal; and it
//! defines the [`MessageHandler`] seam that carriers use to hand inbound
//! messages to a dispatcher. It does not know about sessions, registries, or
//! sockets - those live in `embermcp-server` and `embermcp-transport`.
//!
//! ## Modules
//!
//! - [`jsonrpc`] - envelope types, codec, and standard error codes
//! - [`lifecycle`] - the protocol state machine
//! - [`types`] - MCP wire vocabulary (tools, resources, initialization, ...)
//! - [`error`] - the protocol error type with JSON-RPC code mapping
//! - [`handler`] - the carrier-facing dispatch seam

#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(clippy::all)]

pub mod error;
pub mod handler;
pub mod jsonrpc;
pub mod lifecycle;
pub mod types;

/// The single protocol revision this server speaks.
///
/// Clients requesting this exact version get it echoed back from
/// `initialize`; any other version is rejected with invalid-params.
pub const PROTOCOL_VERSION: &str = "2025-03-26";

/// Maximum accepted size of a single wire message, in bytes.
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

pub use error::{ProtocolError, ProtocolResult};
pub use handler::{DispatchOutcome, MessageHandler, RequestContext};
pub use jsonrpc::{
    JsonRpcError, JsonRpcErrorCode, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, JsonRpcVersion, MessageKind, RequestId,
};
pub use lifecycle::{ProtocolEvent, ProtocolState, StateMachine};
