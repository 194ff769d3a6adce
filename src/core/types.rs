/*!
 * Core Types
 * Common types used across the host
 */

/// Exit status code carried by a termination signal
pub type ExitCode = i32;

/// Heap size in bytes
pub type HeapSize = u64;

/// Monotonic timestamp in nanoseconds
pub type Nanos = u64;

/// Common result type for host-side operations
pub type HostResult<T> = Result<T, super::errors::ProcessError>;
