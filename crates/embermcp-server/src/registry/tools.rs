//! Tool registry
//!
//! Named callables with input schemas, invoked via `tools/call`. The
//! invocation pipeline looks the entry up under the read lock, clones the
//! `Arc`, drops the lock, validates arguments against the type tags of the
//! input schema, runs the executor's own validator, times the execution,
//! and shapes the outcome into the MCP content envelope.
//!
//! Tool failures of every kind - bad arguments, executor errors, unknown
//! names - are folded into the envelope with `isError: true`. They are
//! never JSON-RPC errors; the JSON-RPC response stays a success whose body
//! describes an application-level failure.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::{debug, info, warn};

use embermcp_protocol::types::{CallToolResult, Tool, ToolInputSchema};

use crate::clock::SharedClock;
use crate::error::{ServerError, ServerResult, ToolError};
use crate::registry::validate_entry_name;

/// The callable body of a tool, provided by the embedder.
///
/// `execute` receives the call arguments and returns the raw result value;
/// the registry shapes it into the content envelope. The optional
/// `validate` hook runs after schema checking and before execution.
/// Cleanup on unregistration is `Drop`.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Run the tool
    async fn execute(&self, args: &HashMap<String, Value>) -> Result<Value, ToolError>;

    /// Extra validation beyond the input schema
    fn validate(&self, _args: &HashMap<String, Value>) -> Result<(), ToolError> {
        Ok(())
    }
}

/// Adapter turning a plain closure into a [`ToolExecutor`]
pub struct FnTool<F>(
    /// The wrapped closure
    pub F,
);

impl<F> std::fmt::Debug for FnTool<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnTool(..)")
    }
}

#[async_trait]
impl<F> ToolExecutor for FnTool<F>
where
    F: Fn(&HashMap<String, Value>) -> Result<Value, ToolError> + Send + Sync,
{
    async fn execute(&self, args: &HashMap<String, Value>) -> Result<Value, ToolError> {
        (self.0)(args)
    }
}

/// Descriptive tool metadata
#[derive(Debug, Clone)]
pub struct ToolMetadata {
    /// Tool version string
    pub version: Option<String>,
    /// Tool author
    pub author: Option<String>,
    /// Category label
    pub category: String,
    /// Whether the tool runs work asynchronously on its own
    pub is_async: bool,
    /// Whether the tool can have destructive effects
    pub is_dangerous: bool,
}

impl Default for ToolMetadata {
    fn default() -> Self {
        Self {
            version: None,
            author: None,
            category: "general".to_string(),
            is_async: false,
            is_dangerous: false,
        }
    }
}

/// Advisory per-call resource limits.
///
/// Accounted for in statistics; the core does not interrupt a running
/// executor.
#[derive(Debug, Clone, Copy)]
pub struct ToolLimits {
    /// Execution budget in milliseconds
    pub max_execution_time_ms: u64,
    /// Memory budget in bytes
    pub max_memory_bytes: u64,
}

impl Default for ToolLimits {
    fn default() -> Self {
        Self {
            max_execution_time_ms: 30_000,
            max_memory_bytes: 1024 * 1024,
        }
    }
}

/// Per-tool call statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolStats {
    /// Calls made
    pub calls_made: u64,
    /// Calls whose envelope was a success
    pub calls_successful: u64,
    /// Calls whose envelope was a failure
    pub calls_failed: u64,
    /// Epoch milliseconds of the last call, zero if never called
    pub last_called_ms: u64,
    /// Accumulated execution time in milliseconds
    pub total_execution_ms: f64,
    /// Mean execution time in milliseconds
    pub average_execution_ms: f64,
}

struct RegisteredTool {
    definition: Tool,
    metadata: ToolMetadata,
    limits: ToolLimits,
    executor: Arc<dyn ToolExecutor>,
    stats: Mutex<ToolStats>,
}

#[derive(Default)]
struct ToolTable {
    entries: HashMap<String, Arc<RegisteredTool>>,
    // Registration order; listings iterate it reversed (most recent first).
    order: Vec<String>,
}

/// Registry of named callables
pub struct ToolRegistry {
    table: RwLock<ToolTable>,
    max_tools: usize,
    clock: SharedClock,
    registered_total: AtomicU64,
    unregistered_total: AtomicU64,
    calls_total: AtomicU64,
    calls_successful_total: AtomicU64,
    calls_failed_total: AtomicU64,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.table.read().order)
            .field("max_tools", &self.max_tools)
            .finish()
    }
}

impl ToolRegistry {
    /// Create a registry bounded at `max_tools` entries
    pub fn new(max_tools: usize, clock: SharedClock) -> Self {
        Self {
            table: RwLock::new(ToolTable::default()),
            max_tools,
            clock,
            registered_total: AtomicU64::new(0),
            unregistered_total: AtomicU64::new(0),
            calls_total: AtomicU64::new(0),
            calls_successful_total: AtomicU64::new(0),
            calls_failed_total: AtomicU64::new(0),
        }
    }

    /// Register a tool under its definition's name.
    ///
    /// Fails when the name is invalid, the name collides, or the registry
    /// is at capacity. The definition is immutable after registration.
    pub fn register(
        &self,
        definition: Tool,
        executor: Arc<dyn ToolExecutor>,
    ) -> ServerResult<()> {
        self.register_full(definition, executor, ToolMetadata::default(), ToolLimits::default())
    }

    /// Register a tool with explicit metadata and limits
    pub fn register_full(
        &self,
        definition: Tool,
        executor: Arc<dyn ToolExecutor>,
        metadata: ToolMetadata,
        limits: ToolLimits,
    ) -> ServerResult<()> {
        let name = definition.name.clone();
        if !validate_entry_name(&name) {
            return Err(ServerError::Registration(format!(
                "invalid tool name '{name}'"
            )));
        }

        let mut table = self.table.write();
        if table.entries.contains_key(&name) {
            return Err(ServerError::Registration(format!(
                "tool '{name}' is already registered"
            )));
        }
        if table.entries.len() >= self.max_tools {
            return Err(ServerError::Registration(format!(
                "tool registry is full ({} tools)",
                self.max_tools
            )));
        }
        table.entries.insert(
            name.clone(),
            Arc::new(RegisteredTool {
                definition,
                metadata,
                limits,
                executor,
                stats: Mutex::new(ToolStats::default()),
            }),
        );
        table.order.push(name.clone());
        drop(table);

        self.registered_total.fetch_add(1, Ordering::Relaxed);
        info!(tool = %name, "tool registered");
        Ok(())
    }

    /// Unregister a tool. The entry is unlinked; outstanding handles keep
    /// it alive until dropped.
    pub fn unregister(&self, name: &str) -> ServerResult<()> {
        let mut table = self.table.write();
        if table.entries.remove(name).is_none() {
            return Err(ServerError::Registration(format!(
                "tool '{name}' is not registered"
            )));
        }
        table.order.retain(|n| n != name);
        drop(table);

        self.unregistered_total.fetch_add(1, Ordering::Relaxed);
        info!(tool = %name, "tool unregistered");
        Ok(())
    }

    /// Whether a tool with this exact name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.table.read().entries.contains_key(name)
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.table.read().entries.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.table.read().entries.is_empty()
    }

    /// Tool definitions for `tools/list`, most recently registered first.
    /// The order is stable between calls that do not mutate the registry.
    pub fn definitions(&self) -> Vec<Tool> {
        let table = self.table.read();
        table
            .order
            .iter()
            .rev()
            .filter_map(|name| table.entries.get(name))
            .map(|entry| entry.definition.clone())
            .collect()
    }

    /// A snapshot of a tool's statistics
    pub fn stats(&self, name: &str) -> Option<ToolStats> {
        self.table
            .read()
            .entries
            .get(name)
            .map(|entry| *entry.stats.lock())
    }

    /// Calls made across all tools
    pub fn calls_total(&self) -> u64 {
        self.calls_total.load(Ordering::Relaxed)
    }

    /// Successful calls across all tools
    pub fn calls_successful_total(&self) -> u64 {
        self.calls_successful_total.load(Ordering::Relaxed)
    }

    /// Failed calls across all tools
    pub fn calls_failed_total(&self) -> u64 {
        self.calls_failed_total.load(Ordering::Relaxed)
    }

    /// Invoke a tool and shape the outcome into the content envelope.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<&HashMap<String, Value>>,
    ) -> CallToolResult {
        let entry = {
            let table = self.table.read();
            table.entries.get(name).cloned()
        };
        let Some(entry) = entry else {
            warn!(tool = %name, "call to unknown tool");
            self.calls_total.fetch_add(1, Ordering::Relaxed);
            self.calls_failed_total.fetch_add(1, Ordering::Relaxed);
            return envelope(Err(ToolError::NotFound(format!(
                "tool '{name}' is not registered"
            ))));
        };

        let empty = HashMap::new();
        let args = arguments.unwrap_or(&empty);

        let started_us = self.clock.now_micros();
        let outcome = match check_arguments(&entry.definition.input_schema, args)
            .and_then(|()| entry.executor.validate(args))
        {
            Ok(()) => entry.executor.execute(args).await,
            Err(e) => Err(e),
        };
        let elapsed_ms = self.clock.now_micros().saturating_sub(started_us) as f64 / 1_000.0;

        if let Err(e) = &outcome {
            debug!(tool = %name, kind = e.kind(), error = %e, "tool call failed");
        }
        if elapsed_ms > entry.limits.max_execution_time_ms as f64 {
            warn!(
                tool = %name,
                elapsed_ms,
                budget_ms = entry.limits.max_execution_time_ms,
                "tool exceeded its advisory execution budget"
            );
        }

        let succeeded = outcome.is_ok();
        {
            let mut stats = entry.stats.lock();
            stats.calls_made += 1;
            if succeeded {
                stats.calls_successful += 1;
            } else {
                stats.calls_failed += 1;
            }
            stats.last_called_ms = self.clock.now_millis();
            stats.total_execution_ms += elapsed_ms;
            stats.average_execution_ms = stats.total_execution_ms / stats.calls_made as f64;
        }
        self.calls_total.fetch_add(1, Ordering::Relaxed);
        if succeeded {
            self.calls_successful_total.fetch_add(1, Ordering::Relaxed);
        } else {
            self.calls_failed_total.fetch_add(1, Ordering::Relaxed);
        }

        envelope(outcome)
    }

    /// Descriptive metadata for a registered tool
    pub fn metadata(&self, name: &str) -> Option<ToolMetadata> {
        self.table
            .read()
            .entries
            .get(name)
            .map(|entry| entry.metadata.clone())
    }
}

fn envelope(outcome: Result<Value, ToolError>) -> CallToolResult {
    match outcome {
        Ok(value) => CallToolResult::success(value),
        Err(e) => CallToolResult::failure(e.kind(), &e.to_string(), None),
    }
}

/// Type-tag argument checking against the input schema.
///
/// Required names must be present; each argument with a `"type"` tag in its
/// property schema must match it. Deeper schema facets are accepted but not
/// enforced here.
fn check_arguments(
    schema: &ToolInputSchema,
    args: &HashMap<String, Value>,
) -> Result<(), ToolError> {
    if let Some(required) = &schema.required {
        for name in required {
            if !args.contains_key(name) {
                return Err(ToolError::Validation(format!(
                    "missing required argument '{name}'"
                )));
            }
        }
    }
    if let Some(properties) = &schema.properties {
        for (name, value) in args {
            let Some(property) = properties.get(name) else {
                continue;
            };
            let Some(expected) = property.get("type").and_then(Value::as_str) else {
                continue;
            };
            if !type_matches(value, expected) {
                return Err(ToolError::Validation(format!(
                    "argument '{name}' must be of type '{expected}'"
                )));
            }
        }
    }
    Ok(())
}

fn type_matches(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => false,
    }
}
