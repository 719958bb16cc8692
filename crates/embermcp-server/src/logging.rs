//! Logging initialization
//!
//! Thin bootstrap over `tracing-subscriber`. For stdio servers stdout is
//! the protocol channel, so output goes to stderr or to rolling files -
//! never stdout. File output is buffered through a non-blocking writer; the
//! returned [`LoggingGuard`] must be held for the life of the program so
//! pending lines are flushed on exit.

use std::io;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogOutput, LogRotation, LoggingConfig};

/// Guard that flushes buffered file logs on drop
#[derive(Debug)]
pub struct LoggingGuard {
    _guard: WorkerGuard,
}

impl LoggingConfig {
    /// Install the global tracing subscriber described by this config.
    ///
    /// Returns `Some(LoggingGuard)` for file output (hold it until exit) and
    /// `None` for stderr-only output.
    ///
    /// # Errors
    ///
    /// Fails when the log directory cannot be created or a subscriber is
    /// already installed.
    pub fn init(&self) -> io::Result<Option<LoggingGuard>> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.output {
            LogOutput::None => Ok(None),
            LogOutput::Stderr => {
                let registry = tracing_subscriber::registry().with(filter);
                if self.structured {
                    registry
                        .with(fmt::layer().json().with_writer(io::stderr))
                        .try_init()
                } else {
                    registry
                        .with(fmt::layer().with_writer(io::stderr))
                        .try_init()
                }
                .map_err(|e| io::Error::other(e.to_string()))?;
                Ok(None)
            }
            LogOutput::File => {
                let dir = self.directory.as_ref().ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "file logging requires a directory",
                    )
                })?;
                std::fs::create_dir_all(dir)?;

                let appender = match self.rotation {
                    LogRotation::Hourly => {
                        tracing_appender::rolling::hourly(dir, &self.file_prefix)
                    }
                    LogRotation::Daily => tracing_appender::rolling::daily(dir, &self.file_prefix),
                    LogRotation::Never => tracing_appender::rolling::never(dir, &self.file_prefix),
                };
                let (writer, guard) = tracing_appender::non_blocking(appender);

                let registry = tracing_subscriber::registry().with(filter);
                if self.structured {
                    registry.with(fmt::layer().json().with_writer(writer)).try_init()
                } else {
                    registry.with(fmt::layer().with_writer(writer)).try_init()
                }
                .map_err(|e| io::Error::other(e.to_string()))?;

                Ok(Some(LoggingGuard { _guard: guard }))
            }
        }
    }
}
