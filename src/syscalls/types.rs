/*!
 * Syscall Types
 * Calls a process can make through the trap layer
 */

use crate::core::types::Pid;
use crate::metrics::TimingField;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scheduler and metrics system calls
///
/// Every call returns an `i64`; unknown or invalid targets yield `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "syscall")]
pub enum Syscall {
    /// Pid of the caller
    GetPid,

    /// Ticks since boot
    Uptime,

    /// Tickets of a live runnable/running process
    GetTickets { pid: Pid },

    /// Replace the caller's ticket count
    SetTickets { tickets: i64 },

    /// Ticks a live process has spent on a core
    TicksRun { pid: Pid },

    GetCreationTime { pid: Pid },
    GetStartTime { pid: Pid },
    GetCompletionTime { pid: Pid },
    GetTotalRunTime { pid: Pid },
    GetTotalReadyTime { pid: Pid },

    /// Flag a process killed
    Kill { pid: Pid },

    /// Sleep for a number of ticks
    Sleep { ticks: i64 },
}

impl Syscall {
    /// Stable name used in traces
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GetPid => "getpid",
            Self::Uptime => "uptime",
            Self::GetTickets { .. } => "gettickets",
            Self::SetTickets { .. } => "settickets",
            Self::TicksRun { .. } => "ticks_run",
            Self::GetCreationTime { .. } => "get_creation_time",
            Self::GetStartTime { .. } => "get_start_time",
            Self::GetCompletionTime { .. } => "get_completion_time",
            Self::GetTotalRunTime { .. } => "get_total_run_time",
            Self::GetTotalReadyTime { .. } => "get_total_ready_time",
            Self::Kill { .. } => "kill",
            Self::Sleep { .. } => "sleep",
        }
    }

    /// Timing field read by the metrics getters
    pub const fn timing_field(&self) -> Option<(Pid, TimingField)> {
        match *self {
            Self::GetCreationTime { pid } => Some((pid, TimingField::CreationTime)),
            Self::GetStartTime { pid } => Some((pid, TimingField::StartTime)),
            Self::GetCompletionTime { pid } => Some((pid, TimingField::CompletionTime)),
            Self::GetTotalRunTime { pid } => Some((pid, TimingField::TotalRunTime)),
            Self::GetTotalReadyTime { pid } => Some((pid, TimingField::TotalReadyTime)),
            _ => None,
        }
    }
}

impl fmt::Display for Syscall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
