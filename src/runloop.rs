/*!
 * Host Run Loop
 * Drives guest turns, catches termination, drains ticks between turns
 *
 * Single-threaded cooperative: one turn at a time, then the tick queue, then
 * back to the caller for external events. Nothing here suspends.
 */

use crate::guest::{GuestError, GuestFailure, GuestOutcome, GuestValue};
use crate::scheduler::TickQueue;
use crate::signals::{ExitSignal, RunState};
use log::{debug, info, warn};
use std::sync::Arc;

/// What one top-level turn produced
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Turn and its tick drain completed; the loop stays running
    Completed(GuestValue),
    /// A catchable guest error escaped the turn or a tick; still running
    Faulted(GuestError),
    /// A termination signal unwound to the loop boundary this turn
    Exited(ExitSignal),
    /// The loop had already terminated; nothing was executed
    AlreadyTerminated(ExitSignal),
}

/// Synchronous driver for top-level guest turns.
///
/// Owns the tick queue and the run-state machine. After each turn the queue
/// drains to quiescence (bounded by the optional cycle cap) before control
/// returns to the caller, so re-entrant `nextTick` work never outlives its
/// turn.
pub struct RunLoop {
    queue: Arc<TickQueue>,
    state: RunState,
    status: Option<ExitSignal>,
    cycle_cap: Option<usize>,
    turns: u64,
}

impl RunLoop {
    pub fn new(queue: Arc<TickQueue>) -> Self {
        Self {
            queue,
            state: RunState::Running,
            status: None,
            cycle_cap: None,
            turns: 0,
        }
    }

    /// Bound the number of callbacks one drain cycle may run. Containment
    /// policy for self-re-enqueueing guests; unlimited by default.
    pub fn with_cycle_cap(mut self, cap: usize) -> Self {
        self.cycle_cap = Some(cap);
        self
    }

    pub fn queue(&self) -> &Arc<TickQueue> {
        &self.queue
    }

    pub const fn state(&self) -> RunState {
        self.state
    }

    /// Recorded terminal signal, once terminated
    pub const fn status(&self) -> Option<&ExitSignal> {
        self.status.as_ref()
    }

    pub const fn is_terminated(&self) -> bool {
        self.state.is_terminal()
    }

    pub const fn turns(&self) -> u64 {
        self.turns
    }

    /// Execute one top-level guest turn, then drain the tick queue.
    ///
    /// A termination signal from the turn or from any drained callback
    /// terminates the loop; a catchable error is reported after the drain
    /// and leaves the loop running.
    pub fn run_turn(
        &mut self,
        turn: impl FnOnce() -> GuestOutcome<GuestValue>,
    ) -> TurnOutcome {
        if let Some(signal) = self.status {
            debug!("Turn skipped: loop already terminated ({})", signal);
            return TurnOutcome::AlreadyTerminated(signal);
        }
        self.turns += 1;

        match turn() {
            Err(GuestFailure::Exit(signal)) => self.terminate(signal),
            Err(GuestFailure::Error(err)) => match self.drain_ticks() {
                Err(GuestFailure::Exit(signal)) => self.terminate(signal),
                // The turn's own fault outranks a tick fault for reporting
                _ => TurnOutcome::Faulted(err),
            },
            Ok(value) => match self.drain_ticks() {
                Ok(_) => TurnOutcome::Completed(value),
                Err(GuestFailure::Exit(signal)) => self.terminate(signal),
                Err(GuestFailure::Error(err)) => TurnOutcome::Faulted(err),
            },
        }
    }

    fn drain_ticks(&mut self) -> GuestOutcome<usize> {
        self.queue.drain_capped(self.cycle_cap)
    }

    /// Running -> ExitRequested -> Terminated, recording the signal and
    /// discarding whatever was still queued.
    fn terminate(&mut self, signal: ExitSignal) -> TurnOutcome {
        if let Err(err) = self.state.advance(RunState::ExitRequested) {
            warn!("Run state transition failed: {}", err);
        }
        if let Err(err) = self.state.advance(RunState::Terminated) {
            warn!("Run state transition failed: {}", err);
        }
        self.status = Some(signal);
        let dropped = self.queue.clear();
        if dropped > 0 {
            debug!("Discarded {} queued ticks at termination", dropped);
        }
        info!("Run loop terminated: {}", signal);
        TurnOutcome::Exited(signal)
    }
}
