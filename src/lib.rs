/*!
 * Script Host Process Core
 * Process-control subsystem for an embedded scripting host
 *
 * Provides:
 * - The guest-visible `process` facade (environment, versions, memory, timing)
 * - Termination control flow that unwinds past guest error handlers
 * - A tick queue drained between guest turns
 * - Stream sinks for stdout/stderr with resolvable text encodings
 */

pub mod core;
pub mod events;
pub mod guest;
pub mod memory;
pub mod monitoring;
pub mod process;
pub mod runloop;
pub mod scheduler;
pub mod signals;
pub mod streams;

// Re-exports
pub use crate::core::errors::{ProcessError, StreamError};
pub use crate::core::types::{ExitCode, HostResult, Nanos};
pub use events::EventEmitter;
pub use guest::{catching, GuestCallback, GuestError, GuestFailure, GuestOutcome, GuestValue};
pub use memory::{HeapStats, TrackingAllocator};
pub use monitoring::init_tracing;
pub use process::{
    bind_process, bind_stream, GuestObject, ProcessContext, ProcessContextBuilder, RUNTIME_VERSION,
};
pub use runloop::{RunLoop, TurnOutcome};
pub use scheduler::{TickCallback, TickQueue, TickStats};
pub use signals::{ExitSignal, RunState};
pub use streams::{Encoding, StreamSink};
