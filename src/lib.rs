/*!
 * Scheduling Kernel Library
 *
 * Process table, round-robin/FIFO/lottery scheduling and per-process timing
 * metrics of a small teaching kernel, hosted on OS threads: every core runs
 * a scheduler loop and every process runs on its own execution context.
 */

pub mod core;
pub mod kernel;
pub mod metrics;
pub mod monitoring;
pub mod process;
pub mod scheduler;
pub mod syscalls;

// Re-exports
pub use crate::core::{
    ClockSource, KernelConfig, KernelError, KernelResult, MemoryError, Pid, ProcessError,
    ProcessResult, SchedulerError, Ticks, Tickets,
};
pub use crate::core::sync::{WaitChannel, WakeResult};
pub use kernel::{Kernel, KernelBuilder, RunSummary};
pub use metrics::{MetricsEntry, MetricsOverflow, TimingField};
pub use monitoring::{init_tracing, ComparisonReport, PolicyReport};
pub use process::{ProcContext, ProcInfo, ProcessState};
pub use scheduler::SchedulingPolicy;
pub use syscalls::Syscall;
