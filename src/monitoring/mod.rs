/*!
 * Monitoring Module
 * Structured tracing bootstrap
 */

mod tracer;

pub use tracer::init_tracing;
