/*!
 * Process Types
 * Common types for process management
 */

use crate::core::types::{Pid, Ticks, Tickets};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Slot is free
    #[default]
    Unused,
    /// Slot reserved, identity assigned, not yet runnable
    Embryo,
    /// Blocked on a wait channel
    Sleeping,
    /// Ready to run
    Runnable,
    /// Holds a core
    Running,
    /// Terminated, waiting to be reclaimed by its parent
    Zombie,
}

impl ProcessState {
    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unused => "unused",
            Self::Embryo => "embryo",
            Self::Sleeping => "sleep",
            Self::Runnable => "runble",
            Self::Running => "run",
            Self::Zombie => "zombie",
        }
    }

    /// Terminal states keep only historical data
    #[inline(always)]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Zombie | Self::Unused)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timing fields carried by every record
///
/// Unset optional fields are reported as `0` through the query interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    pub creation_time: Ticks,
    pub start_time: Option<Ticks>,
    pub completion_time: Option<Ticks>,
    pub total_run_time: Ticks,
    pub total_ready_time: Ticks,
    /// Set only while waiting in the ready set
    pub enqueue_time: Option<Ticks>,
    /// Tick at which the current slice began
    pub run_start: Option<Ticks>,
}

impl Timing {
    pub fn created_at(now: Ticks) -> Self {
        Self {
            creation_time: now,
            ..Self::default()
        }
    }
}

/// Process listing entry (procdump)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcInfo {
    pub pid: Pid,
    pub name: String,
    pub state: ProcessState,
    pub tickets: Tickets,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Pid>,
    pub killed: bool,
    pub run_ticks: Ticks,
}

impl fmt::Display for ProcInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:<6} {} tickets={} run_ticks={}",
            self.pid, self.state, self.name, self.tickets, self.run_ticks
        )
    }
}
