/*!
 * Scheduler Types
 * Policy selection and per-process scheduling snapshots
 */

use crate::core::errors::SchedulerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Scheduling policy, fixed for the lifetime of a kernel instance
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchedulingPolicy {
    /// Slot-order scan, one pass over the table at a time
    #[default]
    RoundRobin,
    /// Arrival-order ready queue
    Fifo,
    /// Ticket-weighted random selection
    Lottery,
}

impl SchedulingPolicy {
    /// Every policy, in report order
    pub const ALL: [SchedulingPolicy; 3] = [Self::RoundRobin, Self::Fifo, Self::Lottery];

    /// Convert to string representation
    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RoundRobin => "round_robin",
            Self::Fifo => "fifo",
            Self::Lottery => "lottery",
        }
    }
}

impl FromStr for SchedulingPolicy {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "round_robin" | "roundrobin" | "rr" | "default" => Ok(Self::RoundRobin),
            "fifo" | "fcfs" => Ok(Self::Fifo),
            "lottery" | "lot" => Ok(Self::Lottery),
            _ => Err(SchedulerError::InvalidPolicy(format!(
                "'{}'. Valid: round_robin, fifo, lottery",
                s
            ))),
        }
    }
}

impl fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SchedulingPolicy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SchedulingPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Counters kept by each core's scheduler loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoreStats {
    /// Slices handed to a record
    pub dispatches: u64,
    /// Passes that found nothing dispatchable
    pub idle_passes: u64,
}
