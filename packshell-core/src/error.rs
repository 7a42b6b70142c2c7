/*!
Error types for the packshell core engine.
*/

use thiserror::Error;

/// Result type used throughout the packshell core.
pub type Result<T> = std::result::Result<T, PackshellError>;

/// Errors that can occur while driving external archiver tools.
#[derive(Error, Debug)]
pub enum PackshellError {
    /// I/O errors during filesystem preparation
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or missing input, rejected before any process is spawned
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation the backend cannot perform, regardless of host state
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// A spawned archiver process failed. The message embeds the full
    /// command line and captured stderr; downstream tooling matches on
    /// this format, so it must not change.
    #[error("Unable to execute the following command {command_line} {{output: {stderr}}}")]
    Execution {
        command_line: String,
        stderr: String,
    },

    /// Archiver output that could not be interpreted
    #[error("Parse error: {message}")]
    Parse { message: String, raw: String },

    /// No registered backend can handle the request on this host
    #[error("No supported archiver backend is available")]
    NoSupportedBackend,
}

impl PackshellError {
    /// Create a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a new not supported error
    pub fn not_supported<S: Into<String>>(msg: S) -> Self {
        Self::NotSupported(msg.into())
    }

    /// Create a new execution error from a command line and its stderr
    pub fn execution<S1: Into<String>, S2: Into<String>>(command_line: S1, stderr: S2) -> Self {
        Self::Execution {
            command_line: command_line.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a new parse error, keeping the raw output for diagnostics
    pub fn parse<S1: Into<String>, S2: Into<String>>(message: S1, raw: S2) -> Self {
        Self::Parse {
            message: message.into(),
            raw: raw.into(),
        }
    }
}
