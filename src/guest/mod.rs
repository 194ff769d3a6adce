/*!
 * Guest Module
 * Value marshalling and failure taxonomy at the engine boundary
 */

pub mod error;
pub mod value;

// Re-export public API
pub use error::{catching, GuestError, GuestFailure, GuestOutcome};
pub use value::{GuestCallback, GuestValue};
