//! Initialize handshake types

use serde::{Deserialize, Serialize};

use super::capabilities::{ClientCapabilities, ServerCapabilities};
use super::core::Implementation;

/// `initialize` parameters sent by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeRequest {
    /// Protocol revision the client wants to speak
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Client capability declaration
    #[serde(default)]
    pub capabilities: ClientCapabilities,
    /// Client name and version
    #[serde(rename = "clientInfo")]
    pub client_info: Implementation,
}

/// `initialize` result sent by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeResult {
    /// Protocol revision the server will speak
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    /// Server name and version
    #[serde(rename = "serverInfo")]
    pub server_info: Implementation,
    /// Advertised server capabilities
    pub capabilities: ServerCapabilities,
    /// Usage hints for the client's model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}
