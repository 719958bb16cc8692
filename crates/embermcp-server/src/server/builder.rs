//! Server builder
//!
//! Fluent construction of an [`McpServer`]: configuration first, then tool
//! and resource registrations, then `build()`. Registrations are buffered
//! and applied against the registries once the final configuration (and its
//! capacity limits) is known. There is no hot reload - the surface is fixed
//! when `build()` returns.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use embermcp_protocol::types::{Tool, ToolInputSchema};

use crate::clock::{SharedClock, SystemClock};
use crate::config::{LoggingConfig, ServerConfig, SessionConfig};
use crate::error::{ServerResult, ToolError};
use crate::registry::resources::{BinaryProducer, TextProducer};
use crate::registry::{
    FnTool, ResourceRegistry, SafeFileHandler, TemplateHandler, ToolExecutor, ToolLimits,
    ToolMetadata, ToolRegistry,
};
use crate::routing::RequestDispatcher;
use crate::session::SessionManager;

use super::core::McpServer;

type ToolRegistration = Box<dyn FnOnce(&ToolRegistry) -> ServerResult<()> + Send>;
type ResourceRegistration = Box<dyn FnOnce(&ResourceRegistry) -> ServerResult<()> + Send>;

/// Builder for configuring and constructing an [`McpServer`]
pub struct ServerBuilder {
    config: ServerConfig,
    clock: Option<SharedClock>,
    tool_registrations: Vec<ToolRegistration>,
    resource_registrations: Vec<ResourceRegistration>,
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("config", &self.config)
            .field("pending_tools", &self.tool_registrations.len())
            .field("pending_resources", &self.resource_registrations.len())
            .finish()
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    /// Create a builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            clock: None,
            tool_registrations: Vec::new(),
            resource_registrations: Vec::new(),
        }
    }

    /// Set the server name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the server version
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    /// Set the instructions string included in the initialize result
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.config.instructions = Some(instructions.into());
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the HTTP bind address
    pub fn bind(mut self, bind: impl Into<String>) -> Self {
        self.config.http.bind = bind.into();
        self
    }

    /// Set the HTTP port
    pub fn port(mut self, port: u16) -> Self {
        self.config.http.port = port;
        self
    }

    /// Set the HTTP endpoint path
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.http.endpoint = endpoint.into();
        self
    }

    /// Replace the session settings
    pub fn sessions(mut self, session: SessionConfig) -> Self {
        self.config.session = session;
        self
    }

    /// Replace the logging settings
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Enable verbose wire logging
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Inject a clock (tests use a manual one)
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Register a tool
    pub fn tool(mut self, definition: Tool, executor: Arc<dyn ToolExecutor>) -> Self {
        self.tool_registrations
            .push(Box::new(move |registry| registry.register(definition, executor)));
        self
    }

    /// Register a tool with explicit metadata and limits
    pub fn tool_full(
        mut self,
        definition: Tool,
        executor: Arc<dyn ToolExecutor>,
        metadata: ToolMetadata,
        limits: ToolLimits,
    ) -> Self {
        self.tool_registrations.push(Box::new(move |registry| {
            registry.register_full(definition, executor, metadata, limits)
        }));
        self
    }

    /// Register a closure-backed tool
    pub fn tool_fn<F>(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: ToolInputSchema,
        body: F,
    ) -> Self
    where
        F: Fn(&HashMap<String, Value>) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        self.tool(
            Tool::new(name, description, input_schema),
            Arc::new(FnTool(body)),
        )
    }

    /// Register an inline text resource
    pub fn text_resource(
        mut self,
        uri: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        mime_type: Option<String>,
        content: impl Into<String>,
    ) -> Self {
        let (uri, name, content) = (uri.into(), name.into(), content.into());
        self.resource_registrations.push(Box::new(move |registry| {
            registry.add_text(uri, name, description, mime_type, content)
        }));
        self
    }

    /// Register an inline binary resource
    pub fn binary_resource(
        mut self,
        uri: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        mime_type: Option<String>,
        data: Vec<u8>,
    ) -> Self {
        let (uri, name) = (uri.into(), name.into());
        self.resource_registrations.push(Box::new(move |registry| {
            registry.add_binary(uri, name, description, mime_type, data)
        }));
        self
    }

    /// Register a dynamic text resource
    pub fn dynamic_resource(
        mut self,
        uri: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        mime_type: Option<String>,
        producer: TextProducer,
    ) -> Self {
        let (uri, name) = (uri.into(), name.into());
        self.resource_registrations.push(Box::new(move |registry| {
            registry.add_dynamic_text(uri, name, description, mime_type, producer)
        }));
        self
    }

    /// Register a dynamic binary resource
    pub fn dynamic_binary_resource(
        mut self,
        uri: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        mime_type: Option<String>,
        producer: BinaryProducer,
    ) -> Self {
        let (uri, name) = (uri.into(), name.into());
        self.resource_registrations.push(Box::new(move |registry| {
            registry.add_dynamic_binary(uri, name, description, mime_type, producer)
        }));
        self
    }

    /// Register a file-backed resource
    pub fn file_resource(
        mut self,
        uri: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        mime_type: Option<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        let (uri, name, path) = (uri.into(), name.into(), path.into());
        self.resource_registrations.push(Box::new(move |registry| {
            registry.add_file(uri, name, description, mime_type, path)
        }));
        self
    }

    /// Register a URI template with a custom handler
    pub fn template(
        mut self,
        uri_template: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
        handler: TemplateHandler,
    ) -> Self {
        let (uri_template, name) = (uri_template.into(), name.into());
        self.resource_registrations.push(Box::new(move |registry| {
            registry.add_template(uri_template, name, None, description, None, handler)
        }));
        self
    }

    /// Register a URI template resolving its parameter as a file path under
    /// `root`, with the safety predicate applied
    pub fn file_template(
        self,
        uri_template: impl Into<String>,
        name: impl Into<String>,
        root: impl Into<PathBuf>,
    ) -> Self {
        let max_file_size = self.config.limits.max_file_size;
        let handler = SafeFileHandler::new(root)
            .with_max_size(max_file_size)
            .into_handler();
        self.template(uri_template, name, None, handler)
    }

    /// Assemble the server.
    ///
    /// # Errors
    ///
    /// Fails when any buffered registration is rejected (invalid or
    /// duplicate name, capacity).
    pub fn build(self) -> ServerResult<McpServer> {
        let config = Arc::new(self.config);
        let clock = self.clock.unwrap_or_else(SystemClock::shared);

        let tools = Arc::new(ToolRegistry::new(config.limits.max_tools, clock.clone()));
        for register in self.tool_registrations {
            register(&tools)?;
        }

        let resources = Arc::new(ResourceRegistry::new(config.limits.max_file_size));
        for register in self.resource_registrations {
            register(&resources)?;
        }

        let sessions = SessionManager::new(config.session.clone(), clock.clone());
        let dispatcher = Arc::new(RequestDispatcher::new(
            Arc::clone(&config),
            Arc::clone(&tools),
            Arc::clone(&resources),
            Arc::clone(&sessions),
            clock,
        ));

        Ok(McpServer::from_parts(
            config, tools, resources, sessions, dispatcher,
        ))
    }
}
