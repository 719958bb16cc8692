//! Server error types
//!
//! Two layers of failure live here. [`ServerError`] covers everything that
//! becomes a JSON-RPC error response or a registration failure.
//! [`ToolError`] is different by design: tool failures never become JSON-RPC
//! errors - the registry folds them into the content envelope with
//! `isError: true`, so the JSON-RPC response itself stays a success.

use embermcp_protocol::jsonrpc::JsonRpcError;

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

/// Server-side error taxonomy
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ServerError {
    /// Protocol-layer error (parse, shape, unknown method, bad params)
    #[error(transparent)]
    Protocol(#[from] embermcp_protocol::ProtocolError),

    /// Registration failure (invalid name, duplicate, capacity)
    #[error("registration error: {0}")]
    Registration(String),

    /// Unknown resource URI with no matching template
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// File path violates the safety rules or I/O failed while reading.
    /// Reported to clients as resource-not-found without the cause.
    #[error("resource access denied: {0}")]
    ResourceAccess(String),

    /// Unknown session id
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Session exists but has expired
    #[error("session expired: {0}")]
    SessionExpired(String),

    /// Session manager is at capacity
    #[error("session limit reached ({0} live sessions)")]
    SessionLimit(usize),

    /// A suggested session id is malformed or already taken
    #[error("invalid session id: {0}")]
    InvalidSessionId(String),

    /// Configuration problem detected at build time
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Carrier-level failure
    #[error(transparent)]
    Transport(#[from] embermcp_transport::TransportError),

    /// I/O failure outside the carriers
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unexpected failure inside the server core
    #[error("internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    /// JSON-RPC error code for this error
    pub fn jsonrpc_code(&self) -> i32 {
        match self {
            Self::Protocol(e) => e.code().code(),
            // MCP reserves -32002 for resource-not-found; access violations
            // deliberately share it so the cause is not disclosed.
            Self::ResourceNotFound(_) | Self::ResourceAccess(_) => -32002,
            Self::SessionNotFound(_) | Self::SessionExpired(_) => -32001,
            Self::SessionLimit(_) => -32000,
            Self::InvalidSessionId(_) => -32602,
            Self::Serialization(_) => -32603,
            Self::Registration(_)
            | Self::Configuration(_)
            | Self::Transport(_)
            | Self::Io(_)
            | Self::Internal(_) => -32603,
        }
    }

    /// Convert into a wire error object.
    ///
    /// Resource access violations are reported as plain not-found so path
    /// probing learns nothing from the error text.
    pub fn to_error_object(&self) -> JsonRpcError {
        match self {
            Self::Protocol(e) => e.to_error_object(),
            Self::ResourceAccess(_) => JsonRpcError {
                code: -32002,
                message: "Resource not found".to_string(),
                data: None,
            },
            Self::ResourceNotFound(uri) => JsonRpcError {
                code: -32002,
                message: format!("Resource not found: {uri}"),
                data: None,
            },
            other => JsonRpcError {
                code: other.jsonrpc_code(),
                message: other.to_string(),
                data: None,
            },
        }
    }
}

/// Application-level tool failure, wrapped into the content envelope.
///
/// The kind strings are wire-visible in the `"Error (<kind>): <message>"`
/// text block.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ToolError {
    /// Input failed schema or validator checks
    #[error("{0}")]
    Validation(String),
    /// The executor reported a failure
    #[error("{0}")]
    Execution(String),
    /// The executor exceeded its advisory time budget
    #[error("{0}")]
    Timeout(String),
    /// The executor exceeded its advisory memory budget
    #[error("{0}")]
    Memory(String),
    /// No tool registered under the requested name
    #[error("{0}")]
    NotFound(String),
    /// Unexpected failure inside the registry
    #[error("{0}")]
    Internal(String),
}

impl ToolError {
    /// The wire-visible failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Execution(_) => "execution_error",
            Self::Timeout(_) => "timeout_error",
            Self::Memory(_) => "memory_error",
            Self::NotFound(_) => "not_found_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_error_kinds_are_wire_strings() {
        assert_eq!(ToolError::Validation("x".into()).kind(), "validation_error");
        assert_eq!(ToolError::Execution("x".into()).kind(), "execution_error");
        assert_eq!(ToolError::Timeout("x".into()).kind(), "timeout_error");
        assert_eq!(ToolError::Memory("x".into()).kind(), "memory_error");
        assert_eq!(ToolError::NotFound("x".into()).kind(), "not_found_error");
        assert_eq!(ToolError::Internal("x".into()).kind(), "internal_error");
    }

    #[test]
    fn access_violations_read_as_not_found() {
        let err = ServerError::ResourceAccess("../etc/passwd escapes the root".into());
        let obj = err.to_error_object();
        assert_eq!(obj.code, -32002);
        assert_eq!(obj.message, "Resource not found");
        assert!(obj.data.is_none());
    }

    #[test]
    fn protocol_errors_keep_their_codes() {
        let err = ServerError::from(embermcp_protocol::ProtocolError::MethodNotFound(
            "frob".into(),
        ));
        assert_eq!(err.jsonrpc_code(), -32601);
    }
}
