//! Error types for the portview-core library.

use thiserror::Error;

/// Result type alias for portview operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while discovering servers and acting on them.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to execute a system command or read a listing source.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// Failed to decode command output.
    #[error("Failed to parse output: {0}")]
    ParseError(String),

    /// Failed to signal a process.
    #[error("Failed to kill process {pid}: {reason}")]
    KillFailed { pid: u32, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unserializable YAML configuration.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform not supported.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),
}
