/*!
 * Event Emitter
 * Listener registry the process facade delegates to
 *
 * Held by composition, not inheritance: the facade owns one of these and
 * exposes only emit/listen.
 */

use crate::guest::GuestValue;
use dashmap::DashMap;
use log::trace;
use std::sync::Arc;

/// A registered event listener
pub type Listener = Arc<dyn Fn(&GuestValue) + Send + Sync>;

pub struct EventEmitter {
    listeners: DashMap<String, Vec<Listener>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self {
            listeners: DashMap::new(),
        }
    }

    /// Register a listener for an event name
    pub fn on(&self, event: impl Into<String>, listener: Listener) {
        let event = event.into();
        trace!("Listener registered for '{}'", event);
        self.listeners.entry(event).or_default().push(listener);
    }

    /// Invoke every listener for `event` in registration order.
    /// Returns `true` when at least one listener ran.
    pub fn emit(&self, event: &str, payload: &GuestValue) -> bool {
        // Snapshot outside the registry guard so a listener may register
        // further listeners without deadlocking.
        let snapshot: Vec<Listener> = match self.listeners.get(event) {
            Some(entry) => entry.value().clone(),
            None => return false,
        };
        if snapshot.is_empty() {
            return false;
        }
        for listener in &snapshot {
            listener(payload);
        }
        true
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map_or(0, |e| e.value().len())
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn emit_reports_whether_listeners_ran() {
        let emitter = EventEmitter::new();
        assert!(!emitter.emit("exit", &GuestValue::Undefined));

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        emitter.on(
            "exit",
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
            }),
        );

        assert!(emitter.emit("exit", &GuestValue::Int(0)));
        assert_eq!(hits.load(Ordering::Relaxed), 1);
        assert_eq!(emitter.listener_count("exit"), 1);
    }
}
