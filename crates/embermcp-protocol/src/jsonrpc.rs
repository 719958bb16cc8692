//! # JSON-RPC 2.0 Implementation
//!
//! Envelope types and codec for the JSON-RPC 2.0 dialect MCP is built on.
//! The parser is strict about the JSON-RPC 2.0 structural rules: the version
//! field must be exactly `"2.0"`, a request carries `method` and `id`, a
//! notification carries `method` without `id`, and a response carries `id`
//! plus exactly one of `result` or `error`. Batching is not supported.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::error::ProtocolError;

/// JSON-RPC version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC version type
///
/// Serializes to the literal `"2.0"` and refuses to deserialize anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonRpcVersion;

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(JSONRPC_VERSION)
    }
}

impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let version = String::deserialize(deserializer)?;
        if version == JSONRPC_VERSION {
            Ok(JsonRpcVersion)
        } else {
            Err(serde::de::Error::custom(format!(
                "invalid JSON-RPC version: expected '{JSONRPC_VERSION}', got '{version}'"
            )))
        }
    }
}

/// Request identifier: integer, string, or null.
///
/// The id is echoed bit-for-bit into the matching response - a string id
/// stays a string, a numeric id stays numeric. `Null` appears on error
/// responses to inputs whose id could not be recovered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric identifier
    Number(i64),
    /// String identifier
    String(String),
    /// Null identifier (error responses to unparseable input)
    Null,
}

impl RequestId {
    /// Whether this is the null id
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Null => write!(f, "null"),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// JSON-RPC request message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version
    pub jsonrpc: JsonRpcVersion,
    /// Request method name
    pub method: String,
    /// Request parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Request identifier
    pub id: RequestId,
}

/// JSON-RPC notification message (no response expected)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// JSON-RPC version
    pub jsonrpc: JsonRpcVersion,
    /// Notification method name
    pub method: String,
    /// Notification parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Build an error object from a code with the standard message
    pub fn from_code(code: JsonRpcErrorCode) -> Self {
        Self {
            code: code.code(),
            message: code.message().to_string(),
            data: None,
        }
    }

    /// Parse error (-32700), optionally with detail text
    pub fn parse_error(detail: Option<String>) -> Self {
        Self {
            code: JsonRpcErrorCode::ParseError.code(),
            message: detail
                .unwrap_or_else(|| JsonRpcErrorCode::ParseError.message().to_string()),
            data: None,
        }
    }

    /// Invalid request (-32600)
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: JsonRpcErrorCode::InvalidRequest.code(),
            message: message.into(),
            data: None,
        }
    }

    /// Method not found (-32601) with the offending method in `data`
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: JsonRpcErrorCode::MethodNotFound.code(),
            message: JsonRpcErrorCode::MethodNotFound.message().to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }

    /// Invalid params (-32602) with detail text in `data`
    pub fn invalid_params(details: &str) -> Self {
        Self {
            code: JsonRpcErrorCode::InvalidParams.code(),
            message: JsonRpcErrorCode::InvalidParams.message().to_string(),
            data: Some(serde_json::json!({ "details": details })),
        }
    }

    /// Internal error (-32603), optionally with detail text in `data`
    pub fn internal(details: Option<&str>) -> Self {
        Self {
            code: JsonRpcErrorCode::InternalError.code(),
            message: JsonRpcErrorCode::InternalError.message().to_string(),
            data: details.map(|d| serde_json::json!({ "details": d })),
        }
    }
}

/// JSON-RPC response payload - ensures mutual exclusion of result and error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcResponsePayload {
    /// Successful response with result
    Success {
        /// Response result
        result: Value,
    },
    /// Error response
    Error {
        /// Response error
        error: JsonRpcError,
    },
}

/// JSON-RPC response message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version
    pub jsonrpc: JsonRpcVersion,
    /// Response payload (either result or error, never both)
    #[serde(flatten)]
    pub payload: JsonRpcResponsePayload,
    /// Request identifier (null for errors against unparseable input)
    pub id: RequestId,
}

impl JsonRpcResponse {
    /// Create a successful response
    pub fn success(result: Value, id: RequestId) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            payload: JsonRpcResponsePayload::Success { result },
            id,
        }
    }

    /// Create an error response with the request's id
    pub fn error(error: JsonRpcError, id: RequestId) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            payload: JsonRpcResponsePayload::Error { error },
            id,
        }
    }

    /// Create a parse-error response (id is null)
    pub fn parse_error(detail: Option<String>) -> Self {
        Self::error(JsonRpcError::parse_error(detail), RequestId::Null)
    }

    /// Whether this is a success response
    pub fn is_success(&self) -> bool {
        matches!(self.payload, JsonRpcResponsePayload::Success { .. })
    }

    /// Whether this is an error response
    pub fn is_error(&self) -> bool {
        matches!(self.payload, JsonRpcResponsePayload::Error { .. })
    }

    /// The result, if this is a success response
    pub fn result(&self) -> Option<&Value> {
        match &self.payload {
            JsonRpcResponsePayload::Success { result } => Some(result),
            JsonRpcResponsePayload::Error { .. } => None,
        }
    }

    /// The error, if this is an error response
    pub fn error_object(&self) -> Option<&JsonRpcError> {
        match &self.payload {
            JsonRpcResponsePayload::Success { .. } => None,
            JsonRpcResponsePayload::Error { error } => Some(error),
        }
    }
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC request
    pub fn new(method: impl Into<String>, params: Option<Value>, id: RequestId) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            method: method.into(),
            params,
            id,
        }
    }
}

impl JsonRpcNotification {
    /// Create a new JSON-RPC notification
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            method: method.into(),
            params,
        }
    }
}

/// Standard JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    /// Parse error (-32700)
    ParseError,
    /// Invalid request (-32600)
    InvalidRequest,
    /// Method not found (-32601)
    MethodNotFound,
    /// Invalid params (-32602)
    InvalidParams,
    /// Internal error (-32603)
    InternalError,
    /// Application-defined error
    ApplicationError(i32),
}

impl JsonRpcErrorCode {
    /// The numeric error code
    pub fn code(&self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::ApplicationError(code) => *code,
        }
    }

    /// The standard error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
            Self::ApplicationError(_) => "Application error",
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

impl From<i32> for JsonRpcErrorCode {
    fn from(code: i32) -> Self {
        match code {
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            other => Self::ApplicationError(other),
        }
    }
}

/// JSON-RPC message type (union of request, notification, response)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    /// Request message
    Request(JsonRpcRequest),
    /// Notification message
    Notification(JsonRpcNotification),
    /// Response message
    Response(JsonRpcResponse),
}

/// Shallow classification of a wire message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// A request (has `method` and `id`)
    Request,
    /// A notification (has `method`, no `id`)
    Notification,
    /// A success response (has `result`)
    Response,
    /// An error response (has `error`)
    Error,
}

/// Parse a single JSON-RPC message, enforcing the structural rules.
///
/// `max_len` bounds the accepted input size; oversized or malformed JSON
/// yields a parse error, structurally invalid JSON-RPC yields an
/// invalid-request error.
pub fn parse_message(raw: &str, max_len: usize) -> Result<JsonRpcMessage, ProtocolError> {
    if raw.len() > max_len {
        return Err(ProtocolError::Parse(format!(
            "message of {} bytes exceeds the {max_len} byte limit",
            raw.len()
        )));
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ProtocolError::Parse(format!("invalid JSON: {e}")))?;
    message_from_value(value)
}

/// Build a typed envelope from an already-parsed JSON value.
pub fn message_from_value(value: Value) -> Result<JsonRpcMessage, ProtocolError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ProtocolError::InvalidRequest("message must be a JSON object".into()))?;

    match obj.get("jsonrpc") {
        Some(Value::String(v)) if v == JSONRPC_VERSION => {}
        Some(_) => {
            return Err(ProtocolError::InvalidRequest(format!(
                "jsonrpc field must be the string \"{JSONRPC_VERSION}\""
            )));
        }
        None => {
            return Err(ProtocolError::InvalidRequest(
                "missing jsonrpc version field".into(),
            ));
        }
    }

    if let Some(method) = obj.get("method") {
        if !method.is_string() {
            return Err(ProtocolError::InvalidRequest(
                "method must be a string".into(),
            ));
        }
        if let Some(params) = obj.get("params")
            && !params.is_object()
            && !params.is_array()
            && !params.is_null()
        {
            return Err(ProtocolError::InvalidRequest(
                "params must be an object or array".into(),
            ));
        }
        // With `method` the id key decides: present -> request, absent -> notification.
        if obj.contains_key("id") {
            parse_id(obj.get("id"))?;
            let request: JsonRpcRequest = serde_json::from_value(value)
                .map_err(|e| ProtocolError::InvalidRequest(e.to_string()))?;
            return Ok(JsonRpcMessage::Request(request));
        }
        let notification: JsonRpcNotification = serde_json::from_value(value)
            .map_err(|e| ProtocolError::InvalidRequest(e.to_string()))?;
        return Ok(JsonRpcMessage::Notification(notification));
    }

    // No method: must be a response carrying exactly one of result/error.
    let has_result = obj.contains_key("result");
    let has_error = obj.contains_key("error");
    if has_result == has_error {
        return Err(ProtocolError::InvalidRequest(
            "response must carry exactly one of result or error".into(),
        ));
    }
    if !obj.contains_key("id") {
        return Err(ProtocolError::InvalidRequest(
            "response must carry an id".into(),
        ));
    }
    let id = parse_id(obj.get("id"))?;
    if id.is_null() && has_result {
        return Err(ProtocolError::InvalidRequest(
            "null id is only permitted on error responses".into(),
        ));
    }
    let response: JsonRpcResponse = serde_json::from_value(value)
        .map_err(|e| ProtocolError::InvalidRequest(e.to_string()))?;
    Ok(JsonRpcMessage::Response(response))
}

fn parse_id(id: Option<&Value>) -> Result<RequestId, ProtocolError> {
    match id {
        Some(Value::Number(n)) => n.as_i64().map(RequestId::Number).ok_or_else(|| {
            ProtocolError::InvalidRequest("numeric id must be an integer".into())
        }),
        Some(Value::String(s)) => Ok(RequestId::String(s.clone())),
        Some(Value::Null) => Ok(RequestId::Null),
        Some(_) => Err(ProtocolError::InvalidRequest(
            "id must be an integer, string, or null".into(),
        )),
        None => Ok(RequestId::Null),
    }
}

/// Serialize a message back to its wire form.
///
/// Absent optional fields are omitted entirely; `jsonrpc` is emitted first.
pub fn serialize_message(message: &JsonRpcMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(message).map_err(|e| ProtocolError::Internal(e.to_string()))
}

/// Classify a raw message without building the full envelope.
pub fn classify(raw: &str) -> Result<MessageKind, ProtocolError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ProtocolError::Parse(format!("invalid JSON: {e}")))?;
    let obj = value
        .as_object()
        .ok_or_else(|| ProtocolError::InvalidRequest("message must be a JSON object".into()))?;

    if obj.contains_key("method") {
        if obj.contains_key("id") {
            Ok(MessageKind::Request)
        } else {
            Ok(MessageKind::Notification)
        }
    } else if obj.contains_key("error") {
        Ok(MessageKind::Error)
    } else {
        Ok(MessageKind::Response)
    }
}

/// Re-check the structural invariants of an already-built envelope.
pub fn validate(message: &JsonRpcMessage) -> Result<(), ProtocolError> {
    match message {
        JsonRpcMessage::Request(r) => {
            if r.method.is_empty() {
                return Err(ProtocolError::InvalidRequest(
                    "request method must not be empty".into(),
                ));
            }
        }
        JsonRpcMessage::Notification(n) => {
            if n.method.is_empty() {
                return Err(ProtocolError::InvalidRequest(
                    "notification method must not be empty".into(),
                ));
            }
        }
        JsonRpcMessage::Response(resp) => {
            if resp.id.is_null() && resp.is_success() {
                return Err(ProtocolError::InvalidRequest(
                    "null id is only permitted on error responses".into(),
                ));
            }
        }
    }
    Ok(())
}
