//! Protocol error types and JSON-RPC code mapping
//!
//! Every fallible protocol operation returns a [`ProtocolResult`]; there is
//! no retrievable "last error" side channel.

use crate::jsonrpc::{JsonRpcError, JsonRpcErrorCode};

/// Result type for protocol operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors produced by the codec and state machine
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// Malformed input bytes (invalid JSON or oversized message)
    #[error("parse error: {0}")]
    Parse(String),

    /// Structurally valid JSON that violates JSON-RPC shape
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown method on a request
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// Known method with unacceptable arguments
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// Unexpected failure inside the protocol layer
    #[error("internal error: {0}")]
    Internal(String),
}

impl ProtocolError {
    /// The JSON-RPC error code for this error
    pub fn code(&self) -> JsonRpcErrorCode {
        match self {
            Self::Parse(_) => JsonRpcErrorCode::ParseError,
            Self::InvalidRequest(_) => JsonRpcErrorCode::InvalidRequest,
            Self::MethodNotFound(_) => JsonRpcErrorCode::MethodNotFound,
            Self::InvalidParams(_) => JsonRpcErrorCode::InvalidParams,
            Self::Internal(_) => JsonRpcErrorCode::InternalError,
        }
    }

    /// Convert into a wire error object, attaching the conventional data
    /// payload for method-not-found and invalid-params.
    pub fn to_error_object(&self) -> JsonRpcError {
        match self {
            Self::Parse(detail) => JsonRpcError::parse_error(Some(format!("Parse error: {detail}"))),
            Self::InvalidRequest(detail) => JsonRpcError::invalid_request(detail.clone()),
            Self::MethodNotFound(method) => JsonRpcError::method_not_found(method),
            Self::InvalidParams(details) => JsonRpcError::invalid_params(details),
            Self::Internal(details) => JsonRpcError::internal(Some(details)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_mapping() {
        assert_eq!(
            ProtocolError::Parse("x".into()).code(),
            JsonRpcErrorCode::ParseError
        );
        assert_eq!(
            ProtocolError::MethodNotFound("frob".into()).code(),
            JsonRpcErrorCode::MethodNotFound
        );
    }

    #[test]
    fn method_not_found_carries_method_in_data() {
        let obj = ProtocolError::MethodNotFound("frob".into()).to_error_object();
        assert_eq!(obj.code, -32601);
        assert_eq!(obj.data.unwrap()["method"], "frob");
    }
}
