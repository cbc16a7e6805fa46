//! Error types for running geom and parsing its output.

use geomscan_core::ValidationError;
use thiserror::Error;

use crate::parser::ParseError;

/// Errors from a geom invocation, from request validation through parsing.
#[derive(Debug, Error)]
pub enum DiscoverError {
    /// Filesystem or process I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The request failed validation before anything was executed.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// Captured output could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// No usable geom executable was found.
    #[error("geom binary not found: {0}")]
    BinaryNotFound(String),

    /// geom did not exit within the configured timeout.
    #[error("'{command}' timed out after {timeout_ms} ms")]
    Timeout { command: String, timeout_ms: u64 },

    /// geom exited unsuccessfully. Both output streams are kept for diagnosis.
    #[error("'{command}' failed with {}", describe_exit(.exit_code))]
    SubprocessFailure {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Convenience alias for results with [`DiscoverError`].
pub type Result<T> = std::result::Result<T, DiscoverError>;
