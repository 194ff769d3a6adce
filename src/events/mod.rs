/*!
 * Events Module
 * Minimal emit/listen capability for the process facade
 */

pub mod emitter;

// Re-export public API
pub use emitter::{EventEmitter, Listener};
