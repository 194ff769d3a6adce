/*!
 * Signal Types
 * Exit/abort control value and the run loop state machine
 */

use crate::core::errors::ProcessError;
use crate::core::types::{ExitCode, HostResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One-shot termination request raised by `exit` or `abort`.
///
/// This is control flow, not an error: it does not implement
/// `std::error::Error` and has no conversion into the catchable guest error
/// type, so it unwinds past every guest-level handler by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExitSignal {
    /// `true` for abort (immediate, not a controlled exit path)
    pub fatal: bool,
    /// Status code; always 0 for abort
    pub code: ExitCode,
}

impl ExitSignal {
    /// Controlled termination with an explicit status code
    pub const fn exit(code: ExitCode) -> Self {
        Self { fatal: false, code }
    }

    /// Immediate termination; always code 0, distinguished by the fatal flag
    pub const fn abort() -> Self {
        Self {
            fatal: true,
            code: 0,
        }
    }

    pub const fn is_abort(&self) -> bool {
        self.fatal
    }
}

impl fmt::Display for ExitSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fatal {
            write!(f, "abort")
        } else {
            write!(f, "exit({})", self.code)
        }
    }
}

/// Run loop lifecycle: `Running -> ExitRequested -> Terminated`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    /// Normal guest execution
    Running,
    /// An ExitSignal has unwound to the run loop boundary
    ExitRequested,
    /// Absorbing: no turns or drains are scheduled past this point
    Terminated,
}

impl RunState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RunState::Running => "running",
            RunState::ExitRequested => "exit_requested",
            RunState::Terminated => "terminated",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, RunState::Terminated)
    }

    const fn can_advance_to(self, next: RunState) -> bool {
        matches!(
            (self, next),
            (RunState::Running, RunState::ExitRequested)
                | (RunState::ExitRequested, RunState::Terminated)
        )
    }

    /// Advance the state machine; anything but the two legal transitions is
    /// a host programming error.
    pub fn advance(&mut self, next: RunState) -> HostResult<()> {
        if !self.can_advance_to(next) {
            return Err(ProcessError::InvalidState(format!(
                "{} -> {}",
                self.as_str(),
                next.as_str()
            )));
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_and_abort_are_distinguishable() {
        assert_ne!(ExitSignal::exit(0), ExitSignal::abort());
        assert!(ExitSignal::abort().is_abort());
        assert_eq!(ExitSignal::abort().code, 0);
        assert!(!ExitSignal::exit(5).fatal);
    }

    #[test]
    fn state_machine_rejects_skips_and_regressions() {
        let mut state = RunState::Running;
        assert!(state.advance(RunState::Terminated).is_err());
        state.advance(RunState::ExitRequested).unwrap();
        assert!(state.advance(RunState::ExitRequested).is_err());
        state.advance(RunState::Terminated).unwrap();
        assert!(state.is_terminal());
        assert!(state.advance(RunState::ExitRequested).is_err());
    }
}
