//! Reference front-end for the EmberMCP server.
//!
//! Registers a small demonstration surface (calculator and utility tools, a
//! couple of resources, a safe file template rooted at the working
//! directory) and hands control to the selected carrier.

use std::collections::HashMap;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde_json::{Value, json};
use tracing::info;

use embermcp_protocol::types::ToolInputSchema;
use embermcp_server::{LoggingConfig, ServerBuilder, ToolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TransportKind {
    /// Newline-delimited JSON over stdin/stdout
    Stdio,
    /// HTTP POST endpoint
    Http,
}

/// An embeddable MCP server, standalone edition
#[derive(Debug, Parser)]
#[command(name = "embermcp", version, about)]
struct Args {
    /// Carrier to serve on
    #[arg(long, value_enum, default_value_t = TransportKind::Stdio)]
    transport: TransportKind,

    /// Port for the HTTP carrier
    #[arg(long, default_value_t = 9943)]
    port: u16,

    /// Bind address for the HTTP carrier
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Request path for the HTTP carrier
    #[arg(long, default_value = "/mcp")]
    endpoint: String,

    /// Verbose wire logging
    #[arg(long)]
    debug: bool,
}

fn number_pair_schema() -> ToolInputSchema {
    ToolInputSchema::object(
        HashMap::from([
            ("a".to_string(), json!({"type": "number", "description": "First operand"})),
            ("b".to_string(), json!({"type": "number", "description": "Second operand"})),
        ]),
        vec!["a".to_string(), "b".to_string()],
    )
}

fn text_schema(field: &str, description: &str) -> ToolInputSchema {
    ToolInputSchema::object(
        HashMap::from([(
            field.to_string(),
            json!({"type": "string", "description": description}),
        )]),
        vec![field.to_string()],
    )
}

fn add(args: &HashMap<String, Value>) -> Result<Value, ToolError> {
    // Integer pairs stay integral on the wire; anything else goes float.
    if let (Some(a), Some(b)) = (
        args.get("a").and_then(Value::as_i64),
        args.get("b").and_then(Value::as_i64),
    ) {
        return Ok(json!(a + b));
    }
    let a = args
        .get("a")
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::Validation("'a' must be a number".into()))?;
    let b = args
        .get("b")
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::Validation("'b' must be a number".into()))?;
    Ok(json!(a + b))
}

fn echo(args: &HashMap<String, Value>) -> Result<Value, ToolError> {
    let message = args
        .get("message")
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::Validation("'message' must be a string".into()))?;
    Ok(json!(message))
}

fn generate_uuid(_args: &HashMap<String, Value>) -> Result<Value, ToolError> {
    Ok(json!(uuid::Uuid::new_v4().to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let logging = if args.debug {
        LoggingConfig::stderr("debug")
    } else {
        LoggingConfig::stderr("info")
    };
    let _logging_guard = logging.init().context("logging initialization failed")?;

    let server = ServerBuilder::new()
        .name("embermcp")
        .version(env!("CARGO_PKG_VERSION"))
        .instructions("A demonstration server: calculator and utility tools plus project files.")
        .bind(&args.bind)
        .port(args.port)
        .endpoint(&args.endpoint)
        .logging(logging)
        .debug(args.debug)
        .tool_fn("add", "Add two numbers", number_pair_schema(), add)
        .tool_fn("echo", "Echo a message back", text_schema("message", "Text to echo"), echo)
        .tool_fn(
            "uuid",
            "Generate a random UUID",
            ToolInputSchema::default(),
            generate_uuid,
        )
        .text_resource(
            "embed://about",
            "about",
            Some("What this server is".to_string()),
            None,
            "EmberMCP demonstration server",
        )
        .dynamic_resource(
            "embed://status",
            "status",
            Some("Current server status".to_string()),
            Some("application/json".to_string()),
            std::sync::Arc::new(|| -> embermcp_server::ServerResult<String> {
                Ok(json!({
                    "status": "ok",
                    "time": chrono::Utc::now().to_rfc3339(),
                })
                .to_string())
            }),
        )
        .file_template("file:///./{path}", "project-files", ".")
        .build()
        .context("server construction failed")?;

    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            shutdown.shutdown();
        }
    });

    match args.transport {
        TransportKind::Stdio => server.run_stdio().await?,
        TransportKind::Http => server.run_http().await?,
    }
    Ok(())
}
