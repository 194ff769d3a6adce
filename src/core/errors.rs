/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export the guest-catchable error from the guest module
pub use crate::guest::GuestError;

/// Host-side process errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProcessError {
    #[error("Invalid run state: {0}")]
    #[diagnostic(
        code(process::invalid_state),
        help("The run loop state machine only advances Running -> ExitRequested -> Terminated.")
    )]
    InvalidState(String),

    #[error("Context not initialized: {0}")]
    #[diagnostic(
        code(process::uninitialized),
        help("Build the process context before binding it into guest scope.")
    )]
    Uninitialized(String),
}

/// Stream sink errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum StreamError {
    #[error("Unknown encoding: {0}")]
    #[diagnostic(
        code(stream::unknown_encoding),
        help("Supported encodings: utf8, ascii, latin1, utf16le (plus their aliases).")
    )]
    UnknownEncoding(String),

    #[error("Write failed: {0}")]
    #[diagnostic(
        code(stream::write_failed),
        help("The underlying output target reported an I/O error. The write was not retried.")
    )]
    Io(String),
}

impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        StreamError::Io(err.to_string())
    }
}
