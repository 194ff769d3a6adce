/*!
 * Scheduler Module
 * Deferred-callback queue drained between guest turns
 */

pub mod queue;

// Re-export public API
pub use queue::{TickCallback, TickQueue, TickStats};
