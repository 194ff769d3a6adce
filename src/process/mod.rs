/*!
 * Process Module
 * Guest-visible process facade and its binding table
 */

pub mod bindings;
pub mod context;

// Re-export public API
pub use bindings::{bind_process, bind_stream, GuestObject};
pub use context::{ProcessContext, ProcessContextBuilder, ENGINE_ABI, RUNTIME_VERSION};
