/*!
 * Streams Module
 * Write-only text sinks over byte-oriented output targets
 */

pub mod encoding;
pub mod sink;

// Re-export public API
pub use encoding::Encoding;
pub use sink::StreamSink;
