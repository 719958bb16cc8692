//! Request dispatcher
//!
//! Owns the lifecycle state machine and routes inbound envelopes: the
//! built-ins (`initialize`, `ping`, `notifications/initialized`) are handled
//! here, tool and resource methods are delegated to the registries, unknown
//! methods get method-not-found. Errors never unwind past this layer -
//! every failure inside a dispatch becomes a structured error response on
//! the wire.
//!
//! `initialize` and `ping` are admitted in any state because they establish
//! or probe it; everything else requires the machine to be *ready*.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace, warn};

use embermcp_protocol::jsonrpc::{
    self, JsonRpcError, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    RequestId,
};
use embermcp_protocol::types::{
    CallToolRequest, EmptyResult, Implementation, InitializeRequest, InitializeResult,
    ListResourceTemplatesResult, ListResourcesResult, ListToolsResult, ReadResourceRequest,
    ServerCapabilities,
};
use embermcp_protocol::{
    DispatchOutcome, MessageHandler, PROTOCOL_VERSION, ProtocolError, ProtocolEvent, RequestContext,
    StateMachine,
};

use crate::clock::SharedClock;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::registry::{ResourceRegistry, ToolRegistry};
use crate::session::{Session, SessionManager};

/// Routes inbound envelopes to built-in handlers and the registries
pub struct RequestDispatcher {
    config: Arc<ServerConfig>,
    state: Mutex<StateMachine>,
    tools: Arc<ToolRegistry>,
    resources: Arc<ResourceRegistry>,
    sessions: Arc<SessionManager>,
    clock: SharedClock,
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("state", &self.state.lock().state())
            .finish()
    }
}

impl RequestDispatcher {
    /// Create a dispatcher over the given registries and session manager
    pub fn new(
        config: Arc<ServerConfig>,
        tools: Arc<ToolRegistry>,
        resources: Arc<ResourceRegistry>,
        sessions: Arc<SessionManager>,
        clock: SharedClock,
    ) -> Self {
        Self {
            config,
            state: Mutex::new(StateMachine::new()),
            tools,
            resources,
            sessions,
            clock,
        }
    }

    /// Current lifecycle state, for diagnostics
    pub fn protocol_state(&self) -> embermcp_protocol::ProtocolState {
        self.state.lock().state()
    }

    /// Ask the state machine to shut down; further traffic is rejected.
    pub fn shutdown(&self) {
        let _ = self.state.lock().apply(ProtocolEvent::Shutdown);
    }

    fn touch_session(&self, ctx: &RequestContext) -> Option<Arc<Session>> {
        let id = ctx.session_id.as_deref()?;
        match self.sessions.find(id) {
            Some(session) => {
                session.touch(self.clock.now_millis());
                Some(session)
            }
            None => {
                debug!(session_id = id, "message referenced an unknown session");
                None
            }
        }
    }

    async fn handle_request(
        &self,
        request: JsonRpcRequest,
        session: Option<Arc<Session>>,
    ) -> (JsonRpcResponse, Option<String>) {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request, session),
            "ping" => (
                success_response(&request.id, EmptyResult {}),
                session.map(|s| s.id().to_string()),
            ),
            method => {
                // Ordinary traffic is gated on the ready state.
                {
                    let mut state = self.state.lock();
                    if !state.can_handle_requests() {
                        let error = JsonRpcError::invalid_request(format!(
                            "server not initialized (state: {})",
                            state.state().as_str()
                        ));
                        return (
                            JsonRpcResponse::error(error, request.id.clone()),
                            session.map(|s| s.id().to_string()),
                        );
                    }
                    let _ = state.apply(ProtocolEvent::Request);
                }

                let session_id = session.map(|s| s.id().to_string());
                let response = match method {
                    "tools/list" => self.handle_list_tools(&request),
                    "tools/call" => self.handle_call_tool(&request).await,
                    "resources/list" => self.handle_list_resources(&request),
                    "resources/read" => self.handle_read_resource(&request),
                    "resources/templates/list" => self.handle_list_templates(&request),
                    unknown => JsonRpcResponse::error(
                        JsonRpcError::method_not_found(unknown),
                        request.id.clone(),
                    ),
                };
                (response, session_id)
            }
        }
    }

    fn handle_initialize(
        &self,
        request: JsonRpcRequest,
        session: Option<Arc<Session>>,
    ) -> (JsonRpcResponse, Option<String>) {
        {
            let mut state = self.state.lock();
            if let Err(rejected) = state.apply(ProtocolEvent::InitRequest) {
                return (
                    JsonRpcResponse::error(
                        JsonRpcError::invalid_request(format!(
                            "initialize not permitted in state {}",
                            rejected.state.as_str()
                        )),
                        request.id.clone(),
                    ),
                    session.map(|s| s.id().to_string()),
                );
            }
        }

        let params: InitializeRequest = match parse_params(&request) {
            Ok(params) => params,
            Err(e) => {
                self.state
                    .lock()
                    .record_error(e.jsonrpc_code(), e.to_string());
                return (error_response(&request.id, &e), None);
            }
        };

        if params.protocol_version != PROTOCOL_VERSION {
            let e = ServerError::from(ProtocolError::InvalidParams(format!(
                "unsupported protocol version '{}', supported: {PROTOCOL_VERSION}",
                params.protocol_version
            )));
            self.state
                .lock()
                .record_error(e.jsonrpc_code(), e.to_string());
            return (error_response(&request.id, &e), None);
        }

        // Attribute the handshake to the carrier's session, or mint one.
        let session = match session {
            Some(session) => session,
            None => match self.sessions.create(None) {
                Ok(session) => session,
                Err(e) => {
                    warn!(error = %e, "session creation failed during initialize");
                    self.state
                        .lock()
                        .record_error(e.jsonrpc_code(), e.to_string());
                    return (error_response(&request.id, &e), None);
                }
            },
        };
        if let Err(e) = session.initialize(
            &params.protocol_version,
            Some(params.client_info.name.as_str()),
            Some(params.client_info.version.as_str()),
            self.clock.now_millis(),
        ) {
            debug!(error = %e, session_id = session.id(), "session re-initialized");
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            server_info: Implementation::new(&self.config.name, &self.config.version),
            capabilities: ServerCapabilities::from_registrations(
                !self.tools.is_empty(),
                self.resources.has_registrations(),
            ),
            instructions: self
                .config
                .instructions
                .clone()
                .filter(|text| !text.is_empty()),
        };

        let _ = self.state.lock().apply(ProtocolEvent::InitResponse);
        debug!(
            client = %params.client_info.name,
            session_id = session.id(),
            "initialize handshake complete"
        );
        (
            success_response(&request.id, result),
            Some(session.id().to_string()),
        )
    }

    fn handle_list_tools(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        success_response(
            &request.id,
            ListToolsResult {
                tools: self.tools.definitions(),
            },
        )
    }

    async fn handle_call_tool(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let params: CallToolRequest = match parse_params(request) {
            Ok(params) => params,
            Err(e) => return error_response(&request.id, &e),
        };
        let result = self
            .tools
            .call(&params.name, params.arguments.as_ref())
            .await;
        success_response(&request.id, result)
    }

    fn handle_list_resources(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        success_response(
            &request.id,
            ListResourcesResult {
                resources: self.resources.list(),
            },
        )
    }

    fn handle_read_resource(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let params: ReadResourceRequest = match parse_params(request) {
            Ok(params) => params,
            Err(e) => return error_response(&request.id, &e),
        };
        match self.resources.read(&params.uri) {
            Ok(result) => success_response(&request.id, result),
            Err(e) => error_response(&request.id, &e),
        }
    }

    fn handle_list_templates(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        success_response(
            &request.id,
            ListResourceTemplatesResult {
                resource_templates: self.resources.list_templates(),
            },
        )
    }

    fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "notifications/initialized" => {
                let mut state = self.state.lock();
                match state.apply(ProtocolEvent::InitializedNotification) {
                    Ok(_) => debug!("client reported initialized, protocol ready"),
                    Err(rejected) => debug!(
                        state = rejected.state.as_str(),
                        "initialized notification out of order"
                    ),
                }
            }
            method => {
                let _ = self.state.lock().apply(ProtocolEvent::Notification);
                debug!(method, "ignoring unknown notification");
            }
        }
    }

    fn handle_response(&self, response: &JsonRpcResponse) {
        // The core issues no outgoing requests; correlation is an extension
        // point. Absorb and log.
        let _ = self.state.lock().apply(ProtocolEvent::Response);
        debug!(id = %response.id, "dropping uncorrelated response");
    }
}

#[async_trait]
impl MessageHandler for RequestDispatcher {
    async fn handle_message(&self, raw: &str, ctx: RequestContext) -> DispatchOutcome {
        if self.config.debug {
            trace!(bytes = raw.len(), message = raw, "inbound message");
        }

        let message = match jsonrpc::parse_message(raw, self.config.limits.max_message_size) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, "rejecting undecodable message");
                let response = JsonRpcResponse::error(e.to_error_object(), recover_id(raw));
                return reply_outcome(&response, ctx.session_id);
            }
        };

        let session = self.touch_session(&ctx);

        match message {
            JsonRpcMessage::Request(request) => {
                let (response, session_id) = self.handle_request(request, session).await;
                reply_outcome(&response, session_id)
            }
            JsonRpcMessage::Notification(notification) => {
                self.handle_notification(notification);
                DispatchOutcome {
                    reply: None,
                    session_id: session.map(|s| s.id().to_string()),
                }
            }
            JsonRpcMessage::Response(response) => {
                self.handle_response(&response);
                DispatchOutcome {
                    reply: None,
                    session_id: session.map(|s| s.id().to_string()),
                }
            }
        }
    }
}

fn reply_outcome(response: &JsonRpcResponse, session_id: Option<String>) -> DispatchOutcome {
    let reply = serde_json::to_string(response).unwrap_or_else(|e| {
        // Serialization of our own types failing is a bug; still answer.
        warn!(error = %e, "response serialization failed");
        r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error"},"id":null}"#
            .to_string()
    });
    DispatchOutcome {
        reply: Some(reply),
        session_id,
    }
}

/// Best-effort id recovery for error responses to invalid messages
fn recover_id(raw: &str) -> RequestId {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => match value.get("id") {
            Some(Value::Number(n)) => n.as_i64().map(RequestId::Number).unwrap_or(RequestId::Null),
            Some(Value::String(s)) => RequestId::String(s.clone()),
            _ => RequestId::Null,
        },
        Err(_) => RequestId::Null,
    }
}

fn parse_params<T>(request: &JsonRpcRequest) -> Result<T, ServerError>
where
    T: serde::de::DeserializeOwned,
{
    match &request.params {
        Some(params) => serde_json::from_value(params.clone()).map_err(|e| {
            ServerError::from(ProtocolError::InvalidParams(format!(
                "{}: {e}",
                request.method
            )))
        }),
        None => Err(ServerError::from(ProtocolError::InvalidParams(format!(
            "{}: missing required parameters",
            request.method
        )))),
    }
}

fn success_response<T: serde::Serialize>(id: &RequestId, result: T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(value, id.clone()),
        Err(e) => JsonRpcResponse::error(
            JsonRpcError::internal(Some(&format!("result serialization failed: {e}"))),
            id.clone(),
        ),
    }
}

fn error_response(id: &RequestId, error: &ServerError) -> JsonRpcResponse {
    JsonRpcResponse::error(error.to_error_object(), id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, SharedClock};
    use crate::config::{ServerConfig, SessionConfig};
    use crate::registry::{FnTool, SafeFileHandler};
    use crate::error::ToolError;
    use embermcp_protocol::types::{Tool, ToolInputSchema};
    use serde_json::json;
    use std::collections::HashMap;

    fn dispatcher() -> (RequestDispatcher, Arc<ManualClock>) {
        let clock = ManualClock::starting_at_millis(1_000);
        let shared: SharedClock = clock.clone();
        let config = Arc::new(ServerConfig {
            name: "test-server".into(),
            version: "0.0.1".into(),
            instructions: Some("be gentle".into()),
            session: SessionConfig {
                auto_cleanup: false,
                ..SessionConfig::default()
            },
            ..ServerConfig::default()
        });

        let tools = Arc::new(ToolRegistry::new(
            config.limits.max_tools,
            shared.clone(),
        ));
        let schema = ToolInputSchema::object(
            HashMap::from([
                ("a".to_string(), json!({"type": "number"})),
                ("b".to_string(), json!({"type": "number"})),
            ]),
            vec!["a".to_string(), "b".to_string()],
        );
        tools
            .register(
                Tool::new("add", "Add two numbers", schema),
                Arc::new(FnTool(
                    |args: &HashMap<String, Value>| -> Result<Value, ToolError> {
                        let a = args.get("a").and_then(Value::as_i64).unwrap_or(0);
                        let b = args.get("b").and_then(Value::as_i64).unwrap_or(0);
                        Ok(json!(a + b))
                    },
                )),
            )
            .unwrap();

        let resources = Arc::new(ResourceRegistry::new(config.limits.max_file_size));
        resources
            .add_text("embed://info", "info", None, None, "hello")
            .unwrap();

        let sessions = SessionManager::new(config.session.clone(), shared.clone());
        let dispatcher = RequestDispatcher::new(config, tools, resources, sessions, shared);
        (dispatcher, clock)
    }

    async fn send(dispatcher: &RequestDispatcher, raw: &str) -> Option<Value> {
        let outcome = dispatcher
            .handle_message(raw, RequestContext::for_connection("test"))
            .await;
        outcome
            .reply
            .map(|reply| serde_json::from_str(&reply).unwrap())
    }

    async fn handshake(dispatcher: &RequestDispatcher) {
        let init = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","clientInfo":{"name":"t","version":"0"},"capabilities":{}}}"#;
        let response = send(dispatcher, init).await.unwrap();
        assert!(response.get("result").is_some(), "handshake failed: {response}");
        let none = send(
            dispatcher,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        )
        .await;
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn handshake_then_ping() {
        let (dispatcher, _clock) = dispatcher();

        let init = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","clientInfo":{"name":"t","version":"0"},"capabilities":{}}}"#;
        let response = send(&dispatcher, init).await.unwrap();
        assert_eq!(response["id"], json!(1));
        assert_eq!(response["result"]["protocolVersion"], "2025-03-26");
        assert_eq!(response["result"]["serverInfo"]["name"], "test-server");
        assert_eq!(response["result"]["instructions"], "be gentle");
        // Both registries are populated, so both capabilities are advertised.
        assert!(response["result"]["capabilities"]["tools"].is_object());
        assert!(response["result"]["capabilities"]["resources"].is_object());
        assert!(response["result"]["capabilities"]["logging"].is_object());

        let none = send(
            &dispatcher,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        )
        .await;
        assert!(none.is_none());

        let pong = send(&dispatcher, r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(pong, json!({"jsonrpc":"2.0","result":{},"id":2}));
    }

    #[tokio::test]
    async fn unsupported_protocol_version_is_invalid_params() {
        let (dispatcher, _clock) = dispatcher();
        let init = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-01-01","clientInfo":{"name":"t","version":"0"},"capabilities":{}}}"#;
        let response = send(&dispatcher, init).await.unwrap();
        assert_eq!(response["error"]["code"], json!(-32602));
        // The failed handshake can be retried.
        let retry = r#"{"jsonrpc":"2.0","id":2,"method":"initialize","params":{"protocolVersion":"2025-03-26","clientInfo":{"name":"t","version":"0"},"capabilities":{}}}"#;
        let response = send(&dispatcher, retry).await.unwrap();
        assert!(response.get("result").is_some());
    }

    #[tokio::test]
    async fn requests_before_ready_are_rejected() {
        let (dispatcher, _clock) = dispatcher();
        let response = send(
            &dispatcher,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/list"}"#,
        )
        .await
        .unwrap();
        assert_eq!(response["error"]["code"], json!(-32600));
        assert!(
            response["error"]["message"]
                .as_str()
                .unwrap()
                .contains("not initialized")
        );
    }

    #[tokio::test]
    async fn ping_is_admitted_in_any_state() {
        let (dispatcher, _clock) = dispatcher();
        let pong = send(&dispatcher, r#"{"jsonrpc":"2.0","id":9,"method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(pong["result"], json!({}));
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let (dispatcher, _clock) = dispatcher();
        handshake(&dispatcher).await;

        let response = send(&dispatcher, r#"{"jsonrpc":"2.0","id":9,"method":"frob"}"#)
            .await
            .unwrap();
        assert_eq!(response["error"]["code"], json!(-32601));
        assert_eq!(response["error"]["data"]["method"], "frob");
        assert_eq!(response["id"], json!(9));
    }

    #[tokio::test]
    async fn tool_call_success_and_failure_envelopes() {
        let (dispatcher, _clock) = dispatcher();
        handshake(&dispatcher).await;

        let call = r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"add","arguments":{"a":2,"b":3}}}"#;
        let response = send(&dispatcher, call).await.unwrap();
        assert_eq!(response["result"]["content"][0]["text"], "5");
        assert_eq!(response["result"]["structuredContent"], json!(5));
        assert_eq!(response["result"]["isError"], json!(false));

        let bad = r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"add","arguments":{"a":"two","b":3}}}"#;
        let response = send(&dispatcher, bad).await.unwrap();
        // The JSON-RPC response is a success; the failure lives in the envelope.
        assert!(response.get("error").is_none());
        assert_eq!(response["result"]["isError"], json!(true));
        assert!(
            response["result"]["content"][0]["text"]
                .as_str()
                .unwrap()
                .starts_with("Error (validation_error):")
        );
    }

    #[tokio::test]
    async fn tools_are_listed() {
        let (dispatcher, _clock) = dispatcher();
        handshake(&dispatcher).await;
        let response = send(&dispatcher, r#"{"jsonrpc":"2.0","id":5,"method":"tools/list"}"#)
            .await
            .unwrap();
        assert_eq!(response["result"]["tools"][0]["name"], "add");
        assert!(response["result"]["tools"][0]["inputSchema"].is_object());
    }

    #[tokio::test]
    async fn resources_read_and_list() {
        let (dispatcher, _clock) = dispatcher();
        handshake(&dispatcher).await;

        let response = send(
            &dispatcher,
            r#"{"jsonrpc":"2.0","id":6,"method":"resources/list"}"#,
        )
        .await
        .unwrap();
        assert_eq!(response["result"]["resources"][0]["uri"], "embed://info");

        let response = send(
            &dispatcher,
            r#"{"jsonrpc":"2.0","id":7,"method":"resources/read","params":{"uri":"embed://info"}}"#,
        )
        .await
        .unwrap();
        assert_eq!(response["result"]["contents"][0]["text"], "hello");

        let response = send(
            &dispatcher,
            r#"{"jsonrpc":"2.0","id":8,"method":"resources/read","params":{"uri":"embed://missing"}}"#,
        )
        .await
        .unwrap();
        assert_eq!(response["error"]["code"], json!(-32002));
    }

    #[tokio::test]
    async fn template_read_with_traversal_rejection() {
        let (dispatcher, _clock) = dispatcher();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "# hi").unwrap();
        dispatcher
            .resources
            .add_template(
                "file:///./{path}",
                "files",
                None,
                None,
                None,
                SafeFileHandler::new(dir.path()).into_handler(),
            )
            .unwrap();
        handshake(&dispatcher).await;

        let response = send(
            &dispatcher,
            r#"{"jsonrpc":"2.0","id":10,"method":"resources/read","params":{"uri":"file:///./README.md"}}"#,
        )
        .await
        .unwrap();
        assert_eq!(response["result"]["contents"][0]["uri"], "file:///./README.md");
        assert_eq!(
            response["result"]["contents"][0]["mimeType"],
            "text/markdown"
        );

        let response = send(
            &dispatcher,
            r#"{"jsonrpc":"2.0","id":11,"method":"resources/read","params":{"uri":"file:///./../etc/passwd"}}"#,
        )
        .await
        .unwrap();
        assert_eq!(response["error"]["code"], json!(-32002));
        assert_eq!(response["error"]["message"], "Resource not found");

        let response = send(
            &dispatcher,
            r#"{"jsonrpc":"2.0","id":12,"method":"resources/templates/list"}"#,
        )
        .await
        .unwrap();
        assert_eq!(
            response["result"]["resourceTemplates"][0]["uriTemplate"],
            "file:///./{path}"
        );
    }

    #[tokio::test]
    async fn parse_errors_reply_with_null_id() {
        let (dispatcher, _clock) = dispatcher();
        let response = send(&dispatcher, "{broken").await.unwrap();
        assert_eq!(response["error"]["code"], json!(-32700));
        assert_eq!(response["id"], Value::Null);
    }

    #[tokio::test]
    async fn structural_errors_recover_the_id() {
        let (dispatcher, _clock) = dispatcher();
        // Valid JSON, invalid JSON-RPC (bad version) - the id is recoverable.
        let response = send(&dispatcher, r#"{"jsonrpc":"1.0","id":42,"method":"x"}"#)
            .await
            .unwrap();
        assert_eq!(response["error"]["code"], json!(-32600));
        assert_eq!(response["id"], json!(42));
    }

    #[tokio::test]
    async fn unknown_notifications_are_silently_ignored() {
        let (dispatcher, _clock) = dispatcher();
        handshake(&dispatcher).await;
        let none = send(
            &dispatcher,
            r#"{"jsonrpc":"2.0","method":"notifications/unheard_of"}"#,
        )
        .await;
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn initialize_mints_a_session_and_touch_extends_it() {
        let (dispatcher, clock) = dispatcher();
        let init = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","clientInfo":{"name":"t","version":"0"},"capabilities":{}}}"#;
        let outcome = dispatcher
            .handle_message(init, RequestContext::for_connection("http-0"))
            .await;
        let session_id = outcome.session_id.expect("initialize assigns a session");
        let session = dispatcher.sessions.find(&session_id).unwrap();
        assert!(session.is_active());
        assert_eq!(session.client_name().as_deref(), Some("t"));
        let expiry_before = session.expires_at_ms();

        clock.advance_millis(5_000);
        let ping = r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#;
        let ctx = RequestContext::for_connection("http-1").with_session(session_id.clone());
        let outcome = dispatcher.handle_message(ping, ctx).await;
        assert_eq!(outcome.session_id.as_deref(), Some(session_id.as_str()));
        assert!(session.expires_at_ms() > expiry_before);
    }

    #[tokio::test]
    async fn responses_are_absorbed() {
        let (dispatcher, _clock) = dispatcher();
        handshake(&dispatcher).await;
        let none = send(&dispatcher, r#"{"jsonrpc":"2.0","id":99,"result":{}}"#).await;
        assert!(none.is_none());
    }
}
