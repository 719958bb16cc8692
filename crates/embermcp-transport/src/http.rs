//! HTTP POST carrier
//!
//! Binds a configurable address and accepts `POST` on a configurable path
//! (default `/mcp`). Each request body is delivered to the handler as a
//! single message and each request is its own short-lived connection - no
//! streaming, no server-sent events. The dispatch outcome decides the
//! response: a reply becomes `200` with `Content-Type: application/json`, a
//! notification with no reply becomes `202 Accepted` with an empty body.
//!
//! Session identifiers travel in the `Mcp-Session-Id` header: an inbound
//! header is forwarded to the dispatcher, and the session the dispatcher
//! attributed the message to is echoed back on the response. CORS is
//! permissive.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Response, StatusCode, header};
use axum::routing::post;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, trace};

use embermcp_protocol::{MessageHandler, RequestContext};

use crate::{Carrier, SESSION_HEADER, TransportError, TransportResult};

/// HTTP carrier settings
#[derive(Debug, Clone)]
pub struct HttpCarrierConfig {
    /// Address to bind
    pub bind: String,
    /// Port to bind
    pub port: u16,
    /// Request path serving MCP traffic
    pub endpoint: String,
}

impl Default for HttpCarrierConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 9943,
            endpoint: "/mcp".to_string(),
        }
    }
}

/// Carrier accepting MCP messages over HTTP POST
#[derive(Debug)]
pub struct HttpCarrier {
    config: HttpCarrierConfig,
}

#[derive(Clone)]
struct HttpState {
    handler: Arc<dyn MessageHandler>,
    connection_seq: Arc<AtomicU64>,
}

impl HttpCarrier {
    /// Create an HTTP carrier with the given settings
    pub fn new(config: HttpCarrierConfig) -> Self {
        Self { config }
    }

    /// Build the axum router serving the MCP endpoint.
    ///
    /// Exposed separately so the embedder can mount it into an existing
    /// application and so tests can drive it without a socket.
    pub fn router(handler: Arc<dyn MessageHandler>, endpoint: &str) -> Router {
        let state = HttpState {
            handler,
            connection_seq: Arc::new(AtomicU64::new(0)),
        };
        Router::new()
            .route(endpoint, post(handle_post))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }
}

#[async_trait]
impl Carrier for HttpCarrier {
    async fn serve(
        &self,
        handler: Arc<dyn MessageHandler>,
        mut shutdown: watch::Receiver<bool>,
    ) -> TransportResult<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.bind, self.config.port)
            .parse()
            .map_err(|e| TransportError::Bind(format!("invalid bind address: {e}")))?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| TransportError::Bind(format!("{addr}: {e}")))?;
        info!(%addr, endpoint = %self.config.endpoint, "HTTP carrier listening");

        let app = Self::router(handler, &self.config.endpoint);
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
                debug!("HTTP carrier stopping on shutdown signal");
            })
            .await?;
        Ok(())
    }
}

async fn handle_post(
    State(state): State<HttpState>,
    headers: HeaderMap,
    body: String,
) -> Response<Body> {
    let connection = state.connection_seq.fetch_add(1, Ordering::Relaxed);
    let mut ctx = RequestContext::for_connection(format!("http-{connection}"));
    if let Some(session) = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        ctx = ctx.with_session(session);
    }
    trace!(connection, bytes = body.len(), "HTTP message received");

    let outcome = state.handler.handle_message(&body, ctx).await;

    let mut builder = Response::builder();
    if let Some(session_id) = &outcome.session_id {
        builder = builder.header(SESSION_HEADER, session_id);
    }
    let response = match outcome.reply {
        Some(reply) => builder
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(reply)),
        // Notifications have nothing to say back.
        None => builder.status(StatusCode::ACCEPTED).body(Body::empty()),
    };
    response.unwrap_or_else(|e| {
        Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Body::from(format!("response build failed: {e}")))
            .expect("static error response")
    })
}
