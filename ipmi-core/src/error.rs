//! Error types for IPMI collection.
//!
//! All errors use `thiserror`. Any command line carried by an error has
//! already been through [`crate::command::sanitize_args`], so error values are
//! safe to log and to hand back to the agent.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for IPMI operations.
pub type Result<T> = std::result::Result<T, IpmiError>;

/// Main error type for IPMI collection.
#[derive(Error, Debug)]
pub enum IpmiError {
    // Configuration errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    // Execution errors
    #[error("Command {command:?} timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("Command {command:?} failed: {reason}: {stderr}")]
    Execution {
        command: String,
        reason: String,
        stderr: String,
        /// Whatever the tool wrote to stdout before failing.
        stdout: Vec<u8>,
    },

    // Report errors
    #[error("Unexpected {report} output: {reason}")]
    Format { report: String, reason: String },

    // File system errors
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IpmiError {
    /// Build a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config { reason: reason.into() }
    }

    /// Build a report format error.
    pub fn format(report: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format { report: report.into(), reason: reason.into() }
    }

    /// Short label for logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Timeout { .. } => "timeout",
            Self::Execution { .. } => "execution",
            Self::Format { .. } => "format",
            Self::Io { .. } => "io",
        }
    }

    /// Partial stdout captured from a failed command, if any.
    pub fn partial_stdout(&self) -> Option<&[u8]> {
        match self {
            Self::Execution { stdout, .. } if !stdout.is_empty() => Some(stdout),
            _ => None,
        }
    }
}
