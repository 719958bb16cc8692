//! The assembled server and its run loops

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use embermcp_protocol::MessageHandler;
use embermcp_transport::{Carrier, HttpCarrier, StdioCarrier};

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::registry::{ResourceRegistry, ToolRegistry};
use crate::routing::RequestDispatcher;
use crate::session::SessionManager;

use super::shutdown::ShutdownHandle;

/// An embeddable MCP server.
///
/// Construct one through [`super::ServerBuilder`], then hand control to
/// [`run_stdio`](Self::run_stdio) or [`run_http`](Self::run_http). The run
/// loop blocks (asynchronously) until end-of-input or until the
/// [`ShutdownHandle`] is flipped, then tears down in order: carrier first,
/// state machine, session reaper, registries.
pub struct McpServer {
    config: Arc<ServerConfig>,
    tools: Arc<ToolRegistry>,
    resources: Arc<ResourceRegistry>,
    sessions: Arc<SessionManager>,
    dispatcher: Arc<RequestDispatcher>,
    shutdown_tx: watch::Sender<bool>,
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer")
            .field("name", &self.config.name)
            .field("tools", &self.tools.len())
            .field("resources", &self.resources.len())
            .finish()
    }
}

impl McpServer {
    pub(crate) fn from_parts(
        config: Arc<ServerConfig>,
        tools: Arc<ToolRegistry>,
        resources: Arc<ResourceRegistry>,
        sessions: Arc<SessionManager>,
        dispatcher: Arc<RequestDispatcher>,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            config,
            tools,
            resources,
            sessions,
            dispatcher,
            shutdown_tx,
        }
    }

    /// The server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The tool registry
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    /// The resource registry
    pub fn resources(&self) -> &Arc<ResourceRegistry> {
        &self.resources
    }

    /// The session manager
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// The dispatcher, for mounting into a custom carrier
    pub fn dispatcher(&self) -> Arc<RequestDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// A handle that triggers graceful shutdown
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle::new(self.shutdown_tx.clone())
    }

    /// Serve over stdin/stdout until end-of-input or shutdown
    pub async fn run_stdio(&self) -> ServerResult<()> {
        info!(name = %self.config.name, "serving over stdio");
        self.run_carrier(&StdioCarrier::new()).await
    }

    /// Serve over HTTP until shutdown
    pub async fn run_http(&self) -> ServerResult<()> {
        info!(
            name = %self.config.name,
            bind = %self.config.http.bind,
            port = self.config.http.port,
            endpoint = %self.config.http.endpoint,
            "serving over HTTP"
        );
        self.run_carrier(&HttpCarrier::new(self.config.http.clone()))
            .await
    }

    async fn run_carrier(&self, carrier: &dyn Carrier) -> ServerResult<()> {
        self.sessions.start();
        let handler: Arc<dyn MessageHandler> = self.dispatcher.clone();
        let served = carrier.serve(handler, self.shutdown_tx.subscribe()).await;

        // Teardown order: the carrier has stopped delivering messages, now
        // close the protocol and join the reaper before dropping registries.
        self.dispatcher.shutdown();
        self.sessions.stop().await;
        info!(name = %self.config.name, "server stopped");
        served.map_err(Into::into)
    }
}
