/*!
 * Tick Queue
 * FIFO of zero-argument guest callbacks, drained to quiescence between turns
 */

use crate::guest::GuestOutcome;
use log::{debug, trace};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// A deferred guest callback. May itself enqueue further ticks or raise a
/// termination signal.
pub type TickCallback = Box<dyn FnOnce() -> GuestOutcome<()> + Send>;

/// Queue counters snapshot
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TickStats {
    pub enqueued: u64,
    pub drained: u64,
    pub drain_cycles: u64,
    pub pending: usize,
}

/// Ordered queue of deferred callbacks scheduled by guest code.
///
/// Insertion order is load-bearing: callbacks run in strict enqueue order,
/// with no priority and no cancellation primitive. A callback enqueued
/// during a drain lands on the tail and still runs within the same cycle.
pub struct TickQueue {
    queue: Mutex<VecDeque<TickCallback>>,
    enqueued: AtomicU64,
    drained: AtomicU64,
    drain_cycles: AtomicU64,
}

impl TickQueue {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            enqueued: AtomicU64::new(0),
            drained: AtomicU64::new(0),
            drain_cycles: AtomicU64::new(0),
        }
    }

    /// Append a callback to the tail
    pub fn push(&self, callback: TickCallback) {
        self.queue.lock().push_back(callback);
        let total = self.enqueued.fetch_add(1, Ordering::Relaxed) + 1;
        trace!("Tick enqueued (total {})", total);
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Drain to quiescence, re-entrant insertions included
    pub fn drain(&self) -> GuestOutcome<usize> {
        self.drain_capped(None)
    }

    /// Drain at most `cap` callbacks when a cap is given.
    ///
    /// Callbacks are popped one at a time and invoked outside the queue
    /// lock, so a callback calling `next_tick` appends to the tail of the
    /// cycle currently draining. A failure stops the drain with the
    /// remaining entries still queued; the run loop decides whether they
    /// are ever run (catchable fault) or discarded (termination).
    pub fn drain_capped(&self, cap: Option<usize>) -> GuestOutcome<usize> {
        self.drain_cycles.fetch_add(1, Ordering::Relaxed);
        let mut ran = 0usize;
        loop {
            if let Some(cap) = cap {
                if ran >= cap {
                    debug!("Tick drain cycle capped at {}", cap);
                    break;
                }
            }
            let next = self.queue.lock().pop_front();
            let Some(callback) = next else { break };
            callback()?;
            ran += 1;
            self.drained.fetch_add(1, Ordering::Relaxed);
        }
        if ran > 0 {
            debug!("Drained {} ticks", ran);
        }
        Ok(ran)
    }

    /// Drop every queued callback; used at context teardown
    pub fn clear(&self) -> usize {
        let mut queue = self.queue.lock();
        let dropped = queue.len();
        queue.clear();
        dropped
    }

    pub fn stats(&self) -> TickStats {
        TickStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            drained: self.drained.load(Ordering::Relaxed),
            drain_cycles: self.drain_cycles.load(Ordering::Relaxed),
            pending: self.len(),
        }
    }
}

impl Default for TickQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn drain_runs_in_enqueue_order() {
        let queue = TickQueue::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let order = Arc::clone(&order);
            queue.push(Box::new(move || {
                order.lock().push(i);
                Ok(())
            }));
        }
        assert_eq!(queue.drain().unwrap(), 3);
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn capped_drain_leaves_tail_queued() {
        let queue = TickQueue::new();
        let ran = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let ran = Arc::clone(&ran);
            queue.push(Box::new(move || {
                ran.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }));
        }
        assert_eq!(queue.drain_capped(Some(2)).unwrap(), 2);
        assert_eq!(queue.len(), 3);
        assert_eq!(ran.load(Ordering::Relaxed), 2);
    }
}
