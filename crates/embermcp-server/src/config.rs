//! Server configuration
//!
//! All knobs are plain data gathered into [`ServerConfig`]; registrations
//! and configuration happen during construction and are stable once the run
//! loop starts.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use embermcp_transport::HttpCarrierConfig;

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server name reported from `initialize`
    pub name: String,
    /// Server version reported from `initialize`
    pub version: String,
    /// Usage hints included in the initialize result when non-empty
    pub instructions: Option<String>,
    /// HTTP carrier settings (bind, port, endpoint)
    pub http: HttpCarrierConfig,
    /// Session manager settings
    pub session: SessionConfig,
    /// Size and capacity ceilings
    pub limits: LimitsConfig,
    /// Logging bootstrap settings
    pub logging: LoggingConfig,
    /// Verbose wire logging
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "embermcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: None,
            http: HttpCarrierConfig::default(),
            session: SessionConfig::default(),
            limits: LimitsConfig::default(),
            logging: LoggingConfig::default(),
            debug: false,
        }
    }
}

/// Session manager settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of live sessions
    pub max_sessions: usize,
    /// Idle timeout in seconds before a session expires
    pub session_timeout_secs: u64,
    /// Seconds between reaper passes
    pub cleanup_interval_secs: u64,
    /// Whether the reaper task runs at all
    pub auto_cleanup: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: 10,
            session_timeout_secs: 3600,
            cleanup_interval_secs: 300,
            auto_cleanup: true,
        }
    }
}

/// Size and capacity ceilings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum accepted wire message size in bytes
    pub max_message_size: usize,
    /// Maximum number of registered tools
    pub max_tools: usize,
    /// Maximum size of a file-backed resource in bytes
    pub max_file_size: u64,
    /// Advisory per-call tool budget in milliseconds (accounted, not enforced)
    pub tool_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_message_size: embermcp_protocol::MAX_MESSAGE_SIZE,
            max_tools: 100,
            max_file_size: 1024 * 1024,
            tool_timeout_ms: 30_000,
        }
    }
}

/// Where log output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogOutput {
    /// No logging at all
    None,
    /// Stderr only (stdout is the stdio protocol channel)
    Stderr,
    /// Rolling files in a directory, nothing on the terminal
    File,
}

/// How log files roll over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogRotation {
    /// One file per hour
    Hourly,
    /// One file per day
    Daily,
    /// A single growing file
    #[default]
    Never,
}

/// Logging bootstrap settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (e.g. `"info"`)
    pub level: String,
    /// Emit JSON-structured lines instead of human-readable ones
    pub structured: bool,
    /// Output target
    pub output: LogOutput,
    /// Directory for file output
    pub directory: Option<PathBuf>,
    /// File name prefix for file output
    pub file_prefix: String,
    /// Rotation policy for file output
    pub rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::stderr("info")
    }
}

impl LoggingConfig {
    /// Log to stderr at the given default level
    pub fn stderr(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            structured: false,
            output: LogOutput::Stderr,
            directory: None,
            file_prefix: "embermcp".to_string(),
            rotation: LogRotation::Never,
        }
    }

    /// Log to rolling files under `directory`, keeping the terminal silent.
    /// Use this for stdio servers that must keep stdout pristine.
    pub fn file(directory: impl Into<PathBuf>) -> Self {
        Self {
            level: "info".to_string(),
            structured: false,
            output: LogOutput::File,
            directory: Some(directory.into()),
            file_prefix: "embermcp".to_string(),
            rotation: LogRotation::Daily,
        }
    }

    /// Disable logging entirely
    pub fn disabled() -> Self {
        Self {
            level: "off".to_string(),
            structured: false,
            output: LogOutput::None,
            directory: None,
            file_prefix: "embermcp".to_string(),
            rotation: LogRotation::Never,
        }
    }
}
