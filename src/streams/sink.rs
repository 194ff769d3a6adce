/*!
 * Stream Sinks
 * Synchronous write-only sinks for standard output channels
 *
 * No backpressure is modeled: a write either lands on the target in full or
 * surfaces the target's I/O error to the caller. Good enough for
 * stdout/stderr scope.
 */

use super::encoding::Encoding;
use crate::core::errors::StreamError;
use log::trace;
use parking_lot::Mutex;
use std::io::{self, Write};

/// Write-only byte sink with pluggable text encoding.
///
/// Bound to a fixed target at construction and never reassigned.
pub struct StreamSink {
    name: &'static str,
    target: Mutex<Box<dyn Write + Send>>,
    default_encoding: Encoding,
}

impl StreamSink {
    /// Sink over the host's standard output
    pub fn stdout() -> Self {
        Self::new("stdout", Box::new(io::stdout()), Encoding::Utf8)
    }

    /// Sink over the host's standard error
    pub fn stderr() -> Self {
        Self::new("stderr", Box::new(io::stderr()), Encoding::Utf8)
    }

    /// Sink over an arbitrary target (test harnesses, capture buffers)
    pub fn new(name: &'static str, target: Box<dyn Write + Send>, default_encoding: Encoding) -> Self {
        Self {
            name,
            target: Mutex::new(target),
            default_encoding,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn default_encoding(&self) -> Encoding {
        self.default_encoding
    }

    /// Deliver `data` to the target in the named encoding (sink default when
    /// absent). Returns acceptance, which is always `true` in the
    /// no-backpressure model; target errors surface as `StreamError::Io`.
    pub fn write(&self, data: &str, encoding: Option<&str>) -> Result<bool, StreamError> {
        let encoding = Encoding::resolve(encoding, self.default_encoding)?;
        let bytes = encoding.encode(data);
        let mut target = self.target.lock();
        target.write_all(&bytes)?;
        target.flush()?;
        trace!("{}: wrote {} bytes as {}", self.name, bytes.len(), encoding.as_str());
        Ok(true)
    }

    /// Always writable; no close/half-close state is modeled
    pub const fn is_writable(&self) -> bool {
        true
    }
}
