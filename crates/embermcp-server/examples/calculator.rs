//! Minimal embedding: a calculator served over stdio.
//!
//! ```sh
//! cargo run --example calculator
//! echo '{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","clientInfo":{"name":"demo","version":"0"},"capabilities":{}}}' | cargo run --example calculator
//! ```

use std::collections::HashMap;

use serde_json::{Value, json};

use embermcp_server::prelude::*;

fn pair_schema() -> ToolInputSchema {
    ToolInputSchema::object(
        HashMap::from([
            ("a".to_string(), json!({"type": "number"})),
            ("b".to_string(), json!({"type": "number"})),
        ]),
        vec!["a".to_string(), "b".to_string()],
    )
}

fn number(args: &HashMap<String, Value>, key: &str) -> Result<f64, ToolError> {
    args.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::Validation(format!("'{key}' must be a number")))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    LoggingConfig::stderr("info").init()?;

    let server = ServerBuilder::new()
        .name("calculator")
        .version("1.0.0")
        .instructions("Simple arithmetic over MCP.")
        .tool_fn("add", "Add two numbers", pair_schema(), |args| {
            Ok(json!(number(args, "a")? + number(args, "b")?))
        })
        .tool_fn("multiply", "Multiply two numbers", pair_schema(), |args| {
            Ok(json!(number(args, "a")? * number(args, "b")?))
        })
        .tool_fn("divide", "Divide a by b", pair_schema(), |args| {
            let b = number(args, "b")?;
            if b == 0.0 {
                return Err(ToolError::Execution("division by zero".into()));
            }
            Ok(json!(number(args, "a")? / b))
        })
        .text_resource(
            "calc://help",
            "help",
            Some("How to use the calculator".to_string()),
            Some("text/markdown".to_string()),
            "# Calculator\n\nCall `add`, `multiply`, or `divide` with `a` and `b`.\n",
        )
        .build()?;

    server.run_stdio().await?;
    Ok(())
}
