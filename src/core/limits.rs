/*!
 * System Limits and Constants
 *
 * Centralized location for process-table sizes, scheduling defaults and
 * timing constants. Grouped by domain.
 */

use crate::core::types::{Pid, Tickets};
use std::time::Duration;

// =============================================================================
// PROCESS TABLE
// =============================================================================

/// Maximum number of process records (NPROC)
pub const MAX_PROCESSES: usize = 64;

/// First pid handed out; pid 0 is never a live identity
pub const FIRST_PID: Pid = 1;

/// Debug name of the root process
pub const ROOT_PROCESS_NAME: &str = "init";

/// Stack size for a process execution context (its "kernel stack")
pub const DEFAULT_CONTEXT_STACK_SIZE: usize = 256 * 1024;

// =============================================================================
// SCHEDULING
// =============================================================================

/// Tickets given to every freshly allocated record
pub const DEFAULT_TICKETS: Tickets = 10;

/// Default number of execution cores
pub const DEFAULT_CPUS: usize = 1;

/// Upper bound on configured cores
pub const MAX_CPUS: usize = 8;

/// Default lottery seed (matches an unseeded generator)
pub const DEFAULT_LOTTERY_SEED: u32 = 1;

/// How long an idle core waits for work before rescanning the table
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Minimum ticks charged for any slice that received a core
pub const MIN_SLICE_TICKS: u64 = 1;

// =============================================================================
// METRICS
// =============================================================================

/// Capacity of the terminal metrics store
pub const METRICS_CAPACITY: usize = 64;

// =============================================================================
// SYSCALLS
// =============================================================================

/// Sentinel returned by the syscall layer for unknown or invalid values
pub const SYSCALL_ERROR: i64 = -1;
