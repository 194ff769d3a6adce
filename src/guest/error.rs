/*!
 * Guest Failure Taxonomy
 * Catchable guest errors vs. uncatchable termination control flow
 *
 * `GuestError` is the only side a guest-level catch construct can observe.
 * `ExitSignal` rides in the other variant of `GuestFailure` and has no
 * conversion into `GuestError`, so guest handlers structurally cannot
 * intercept a termination request.
 */

use crate::core::errors::StreamError;
use crate::signals::ExitSignal;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for every operation observable from guest code
pub type GuestOutcome<T> = Result<T, GuestFailure>;

/// Errors a guest-level handler may intercept
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum GuestError {
    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(guest::invalid_argument),
        help("A process operation received an argument of the wrong type or range.")
    )]
    InvalidArgument(String),

    #[error("Stream write failed: {0}")]
    #[diagnostic(
        code(guest::io),
        help("The output target reported an I/O error. The write was not retried.")
    )]
    Io(String),

    #[error("No such member: {0}")]
    #[diagnostic(
        code(guest::unknown_member),
        help("The process object exposes a fixed set of properties and methods.")
    )]
    UnknownMember(String),

    #[error("Tick scheduler unavailable: {0}")]
    #[diagnostic(
        code(guest::scheduler_gone),
        help("The owning execution context has been torn down; callbacks can no longer be scheduled.")
    )]
    SchedulerGone(String),
}

impl From<StreamError> for GuestError {
    fn from(err: StreamError) -> Self {
        match err {
            // A bad encoding name is a caller mistake, not a target failure
            StreamError::UnknownEncoding(name) => {
                GuestError::InvalidArgument(format!("unknown encoding '{}'", name))
            }
            StreamError::Io(msg) => GuestError::Io(msg),
        }
    }
}

/// Failure raised out of a guest call
#[derive(Debug, Clone, PartialEq)]
pub enum GuestFailure {
    /// Ordinary catchable error
    Error(GuestError),
    /// Termination control flow; unwinds past every guest handler
    Exit(ExitSignal),
}

impl GuestFailure {
    /// Whether a guest-level catch construct may observe this failure
    pub const fn catchable(&self) -> bool {
        matches!(self, GuestFailure::Error(_))
    }

    pub const fn exit_signal(&self) -> Option<&ExitSignal> {
        match self {
            GuestFailure::Exit(signal) => Some(signal),
            GuestFailure::Error(_) => None,
        }
    }
}

impl fmt::Display for GuestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuestFailure::Error(e) => write!(f, "{}", e),
            GuestFailure::Exit(signal) => write!(f, "{}", signal),
        }
    }
}

impl From<GuestError> for GuestFailure {
    fn from(err: GuestError) -> Self {
        GuestFailure::Error(err)
    }
}

impl From<ExitSignal> for GuestFailure {
    fn from(signal: ExitSignal) -> Self {
        GuestFailure::Exit(signal)
    }
}

/// Model of the engine's guest-level catch construct.
///
/// Applies `handler` to catchable errors only; a termination signal passes
/// through untouched, which is the property the run loop relies on.
pub fn catching<T>(
    outcome: GuestOutcome<T>,
    handler: impl FnOnce(GuestError) -> GuestOutcome<T>,
) -> GuestOutcome<T> {
    match outcome {
        Err(GuestFailure::Error(err)) => handler(err),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catching_intercepts_errors_only() {
        let caught = catching(
            Err::<i32, _>(GuestError::InvalidArgument("x".into()).into()),
            |_| Ok(42),
        );
        assert_eq!(caught, Ok(42));

        let passed = catching(Err::<i32, _>(ExitSignal::exit(3).into()), |_| Ok(42));
        assert_eq!(passed, Err(GuestFailure::Exit(ExitSignal::exit(3))));
    }
}
