/*!
 * Scheduler Module
 * Per-core dispatch loop and the interchangeable selection policies
 */

pub mod cpu;
pub mod dispatch;
pub mod policy;
pub mod random;
pub mod types;

// Re-export public API
pub use policy::{Fifo, Lottery, RoundRobin, Strategy};
pub use random::Lcg;
pub use types::{CoreStats, SchedulingPolicy};
