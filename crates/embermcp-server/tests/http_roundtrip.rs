//! Full-stack checks over the HTTP carrier: the axum router in front of a
//! real dispatcher, driven without a socket. Sessions ride the
//! `Mcp-Session-Id` header; notifications come back as `202 Accepted`.

use std::collections::HashMap;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use embermcp_protocol::types::ToolInputSchema;
use embermcp_server::{McpServer, ServerBuilder, SessionConfig, ToolError};
use embermcp_transport::{HttpCarrier, SESSION_HEADER};

fn build_server() -> McpServer {
    ServerBuilder::new()
        .name("http-server")
        .version("0.0.1")
        .sessions(SessionConfig {
            max_sessions: 4,
            session_timeout_secs: 60,
            cleanup_interval_secs: 300,
            auto_cleanup: false,
        })
        .tool_fn(
            "echo",
            "Echo a message back",
            ToolInputSchema::object(
                HashMap::from([(
                    "message".to_string(),
                    json!({"type": "string"}),
                )]),
                vec!["message".to_string()],
            ),
            |args| {
                let message = args
                    .get("message")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::Validation("'message' must be a string".into()))?;
                Ok(json!(message))
            },
        )
        .build()
        .unwrap()
}

fn app(server: &McpServer) -> Router {
    HttpCarrier::router(server.dispatcher(), "/mcp")
}

async fn post(app: Router, body: &str, session: Option<&str>) -> (StatusCode, Option<String>, Value) {
    let mut request = Request::post("/mcp").header(header::CONTENT_TYPE, "application/json");
    if let Some(session) = session {
        request = request.header(SESSION_HEADER, session);
    }
    let response = app
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let session = response
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, session, value)
}

#[tokio::test]
async fn initialize_assigns_a_session_header() {
    let server = build_server();
    let (status, session, body) = post(
        app(&server),
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","clientInfo":{"name":"t","version":"0"},"capabilities":{}}}"#,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["protocolVersion"], "2025-03-26");
    let session_id = session.expect("initialize response carries a session header");
    assert!(server.sessions().find(&session_id).is_some());
}

#[tokio::test]
async fn initialized_notification_is_202_with_empty_body() {
    let server = build_server();
    let (_, session, _) = post(
        app(&server),
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","clientInfo":{"name":"t","version":"0"},"capabilities":{}}}"#,
        None,
    )
    .await;
    let session_id = session.unwrap();

    let (status, _, body) = post(
        app(&server),
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        Some(&session_id),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn full_handshake_then_tool_call_over_http() {
    let server = build_server();

    let (_, session, _) = post(
        app(&server),
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","clientInfo":{"name":"t","version":"0"},"capabilities":{}}}"#,
        None,
    )
    .await;
    let session_id = session.unwrap();

    post(
        app(&server),
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        Some(&session_id),
    )
    .await;

    let (status, echoed_session, body) = post(
        app(&server),
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"echo","arguments":{"message":"over http"}}}"#,
        Some(&session_id),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(echoed_session.as_deref(), Some(session_id.as_str()));
    assert_eq!(body["result"]["isError"], json!(false));
    assert_eq!(body["result"]["structuredContent"], "over http");
}

#[tokio::test]
async fn requests_touch_the_session() {
    let server = build_server();
    let (_, session, _) = post(
        app(&server),
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","clientInfo":{"name":"t","version":"0"},"capabilities":{}}}"#,
        None,
    )
    .await;
    let session_id = session.unwrap();
    let handle = server.sessions().find(&session_id).unwrap();
    let before = handle.last_activity_ms();

    // A later request on the same session must not regress activity.
    post(
        app(&server),
        r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
        Some(&session_id),
    )
    .await;
    assert!(handle.last_activity_ms() >= before);
    assert_eq!(server.sessions().count(), 1);
}

#[tokio::test]
async fn parse_errors_still_reply_on_http() {
    let server = build_server();
    let (status, _, body) = post(app(&server), "{not json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], json!(-32700));
    assert_eq!(body["id"], Value::Null);
}
