/*!
 * Monitoring
 * Structured tracing and scheduler performance reporting
 */

pub mod report;
mod tracer;

pub use report::{Averages, ComparisonReport, PolicyReport, ProcessTimes};
pub use tracer::{init_tracing, SyscallSpan};
