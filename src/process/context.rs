/*!
 * Process Context
 * Host-process facade bound into the guest global scope
 *
 * One context per guest execution context, built once at host startup and
 * dropped at teardown. All operations are synchronous and non-suspending;
 * exit/abort unwind synchronously via the failure channel.
 */

use crate::core::types::{ExitCode, Nanos};
use crate::events::EventEmitter;
use crate::guest::{GuestError, GuestFailure, GuestOutcome, GuestValue};
use crate::memory::HeapStats;
use crate::scheduler::{TickCallback, TickQueue};
use crate::signals::ExitSignal;
use crate::streams::StreamSink;
use log::info;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

/// Host-runtime version string exposed as `process.version`
pub const RUNTIME_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version tag of the guest-visible process surface
pub const ENGINE_ABI: &str = "1";

/// The `process` facade.
///
/// Owns its stream sinks and event emitter; the tick queue is injected and
/// held weakly, since its lifetime belongs to the run loop.
pub struct ProcessContext {
    started: Instant,
    stdout: Arc<StreamSink>,
    stderr: Arc<StreamSink>,
    scheduler: Weak<TickQueue>,
    events: EventEmitter,
    last_hrtime: AtomicU64,
}

/// Builder for ProcessContext
pub struct ProcessContextBuilder {
    stdout: Option<Arc<StreamSink>>,
    stderr: Option<Arc<StreamSink>>,
    scheduler: Weak<TickQueue>,
    events: Option<EventEmitter>,
}

impl ProcessContextBuilder {
    pub fn new() -> Self {
        Self {
            stdout: None,
            stderr: None,
            scheduler: Weak::new(),
            events: None,
        }
    }

    /// Replace the standard output sink (defaults to the real stdout)
    pub fn with_stdout(mut self, sink: Arc<StreamSink>) -> Self {
        self.stdout = Some(sink);
        self
    }

    /// Replace the standard error sink (defaults to the real stderr)
    pub fn with_stderr(mut self, sink: Arc<StreamSink>) -> Self {
        self.stderr = Some(sink);
        self
    }

    /// Inject the tick queue; the context calls into it but does not own it
    pub fn with_scheduler(mut self, queue: &Arc<TickQueue>) -> Self {
        self.scheduler = Arc::downgrade(queue);
        self
    }

    /// Provide a pre-populated event emitter
    pub fn with_events(mut self, events: EventEmitter) -> Self {
        self.events = Some(events);
        self
    }

    /// Build the ProcessContext
    pub fn build(self) -> ProcessContext {
        let mut features = vec!["stdout", "stderr"];
        if self.scheduler.upgrade().is_some() {
            features.push("scheduler");
        }
        if self.events.is_some() {
            features.push("events");
        }
        info!("Process context initialized with: {}", features.join(", "));

        ProcessContext {
            started: Instant::now(),
            stdout: self.stdout.unwrap_or_else(|| Arc::new(StreamSink::stdout())),
            stderr: self.stderr.unwrap_or_else(|| Arc::new(StreamSink::stderr())),
            scheduler: self.scheduler,
            events: self.events.unwrap_or_default(),
            last_hrtime: AtomicU64::new(0),
        }
    }
}

impl Default for ProcessContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessContext {
    /// Create a builder for constructing a ProcessContext
    pub fn builder() -> ProcessContextBuilder {
        ProcessContextBuilder::new()
    }

    pub fn stdout(&self) -> &Arc<StreamSink> {
        &self.stdout
    }

    pub fn stderr(&self) -> &Arc<StreamSink> {
        &self.stderr
    }

    /// Event capability the facade delegates to
    pub fn events(&self) -> &EventEmitter {
        &self.events
    }

    /// Controlled termination. Always produces a failure: a termination
    /// signal for a valid (or absent) code, a catchable argument error
    /// otherwise. Guest code after the call never runs either way.
    pub fn exit(&self, code: Option<&GuestValue>) -> GuestFailure {
        match coerce_exit_code(code) {
            Ok(code) => GuestFailure::Exit(ExitSignal::exit(code)),
            Err(err) => GuestFailure::Error(err),
        }
    }

    /// Immediate termination, always code 0, fatal flag set
    pub fn abort(&self) -> GuestFailure {
        GuestFailure::Exit(ExitSignal::abort())
    }

    /// Snapshot of the host environment at call time, not a live view
    pub fn getenv(&self) -> GuestValue {
        let map: BTreeMap<String, GuestValue> = std::env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    GuestValue::Str(v.to_string_lossy().into_owned()),
                )
            })
            .collect();
        GuestValue::Map(map)
    }

    pub fn version(&self) -> &'static str {
        RUNTIME_VERSION
    }

    /// Component name -> version string
    pub fn versions(&self) -> GuestValue {
        GuestValue::map([
            ("script-host", GuestValue::from(RUNTIME_VERSION)),
            ("process-abi", GuestValue::from(ENGINE_ABI)),
        ])
    }

    pub fn platform(&self) -> &'static str {
        std::env::consts::OS
    }

    /// Best-effort path of the host executable
    pub fn exec_path(&self) -> GuestValue {
        match std::env::current_exe() {
            Ok(path) => GuestValue::Str(path.to_string_lossy().into_owned()),
            Err(_) => GuestValue::Undefined,
        }
    }

    /// `{heapTotal, heapUsed}` in bytes, sampled from the allocator counters
    pub fn memory_usage(&self) -> GuestValue {
        let stats = HeapStats::sample();
        GuestValue::map([
            ("heapTotal", GuestValue::Int(stats.heap_total as i64)),
            ("heapUsed", GuestValue::Int(stats.heap_used as i64)),
        ])
    }

    /// Whole seconds since context creation, monotonic non-decreasing
    pub fn uptime(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Monotonic nanosecond timestamp, strictly increasing across calls.
    /// Equal clock samples are bumped past the previous return value.
    pub fn hrtime(&self) -> Nanos {
        let now = self.started.elapsed().as_nanos() as u64;
        let mut prev = self.last_hrtime.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self.last_hrtime.compare_exchange_weak(
                prev,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(observed) => prev = observed,
            }
        }
    }

    /// Enqueue a deferred callback on the injected tick queue
    pub fn next_tick(&self, callback: TickCallback) -> GuestOutcome<()> {
        match self.scheduler.upgrade() {
            Some(queue) => {
                queue.push(callback);
                Ok(())
            }
            None => Err(GuestError::SchedulerGone("tick queue dropped".to_string()).into()),
        }
    }
}

/// Deterministic exit-code coercion: absent -> 0, in-range integers pass,
/// finite floats truncate toward zero, everything else is rejected.
fn coerce_exit_code(value: Option<&GuestValue>) -> Result<ExitCode, GuestError> {
    let Some(value) = value else { return Ok(0) };
    match value {
        GuestValue::Int(i) => ExitCode::try_from(*i)
            .map_err(|_| GuestError::InvalidArgument(format!("exit code out of range: {}", i))),
        GuestValue::Float(f) if f.is_finite() => {
            let truncated = f.trunc();
            if truncated >= ExitCode::MIN as f64 && truncated <= ExitCode::MAX as f64 {
                Ok(truncated as ExitCode)
            } else {
                Err(GuestError::InvalidArgument(format!(
                    "exit code out of range: {}",
                    f
                )))
            }
        }
        other => Err(GuestError::InvalidArgument(format!(
            "exit code must be an integer, got {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_is_deterministic() {
        assert_eq!(coerce_exit_code(None).unwrap(), 0);
        assert_eq!(coerce_exit_code(Some(&GuestValue::Int(5))).unwrap(), 5);
        assert_eq!(coerce_exit_code(Some(&GuestValue::Float(3.9))).unwrap(), 3);
        assert_eq!(coerce_exit_code(Some(&GuestValue::Float(-3.9))).unwrap(), -3);
        assert!(coerce_exit_code(Some(&GuestValue::Int(i64::MAX))).is_err());
        assert!(coerce_exit_code(Some(&GuestValue::Float(f64::NAN))).is_err());
        assert!(coerce_exit_code(Some(&GuestValue::Float(f64::INFINITY))).is_err());
        assert!(coerce_exit_code(Some(&GuestValue::Str("5".into()))).is_err());
        assert!(coerce_exit_code(Some(&GuestValue::Undefined)).is_err());
    }

    #[test]
    fn hrtime_strictly_increases_without_delay() {
        let ctx = ProcessContext::builder().build();
        let a = ctx.hrtime();
        let b = ctx.hrtime();
        let c = ctx.hrtime();
        assert!(a < b && b < c);
    }
}
