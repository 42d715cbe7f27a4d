/*!
 * Metrics Queries
 *
 * Pid-addressed lookups: the live table first, then the metrics store.
 * The table guard is dropped before the store lock is taken, so a query
 * never holds metrics → table.
 */

use super::store::{MetricsEntry, MetricsStore};
use crate::core::types::{Pid, Ticks, Tickets};
use crate::process::record::ProcRecord;
use crate::process::table::ProcTable;
use crate::process::ProcessState;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Timing field addressed by a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingField {
    CreationTime,
    StartTime,
    CompletionTime,
    TotalRunTime,
    TotalReadyTime,
}

impl TimingField {
    pub const ALL: [TimingField; 5] = [
        Self::CreationTime,
        Self::StartTime,
        Self::CompletionTime,
        Self::TotalRunTime,
        Self::TotalReadyTime,
    ];

    fn from_record(self, record: &ProcRecord) -> Ticks {
        let timing = record.timing();
        match self {
            Self::CreationTime => timing.creation_time,
            Self::StartTime => timing.start_time.unwrap_or(0),
            Self::CompletionTime => timing.completion_time.unwrap_or(0),
            Self::TotalRunTime => timing.total_run_time,
            Self::TotalReadyTime => timing.total_ready_time,
        }
    }

    fn from_entry(self, entry: &MetricsEntry) -> Ticks {
        match self {
            Self::CreationTime => entry.creation_time,
            Self::StartTime => entry.start_time,
            Self::CompletionTime => entry.completion_time,
            Self::TotalRunTime => entry.total_run_time,
            Self::TotalReadyTime => entry.total_ready_time,
        }
    }
}

/// Tickets of a live Runnable or Running record
pub fn tickets(table: &Mutex<ProcTable>, pid: Pid) -> Option<Tickets> {
    let table = table.lock();
    table
        .record(pid)
        .filter(|r| matches!(r.state(), ProcessState::Runnable | ProcessState::Running))
        .map(ProcRecord::tickets)
}

/// Run ticks of a live, non-terminal record
pub fn run_ticks(table: &Mutex<ProcTable>, pid: Pid) -> Option<Ticks> {
    let table = table.lock();
    table
        .record(pid)
        .filter(|r| !r.state().is_terminal())
        .map(ProcRecord::run_ticks)
}

/// Timing field of a live record, else of its stored snapshot
pub fn timing(
    table: &Mutex<ProcTable>,
    store: &Mutex<MetricsStore>,
    pid: Pid,
    field: TimingField,
) -> Option<Ticks> {
    let live = {
        let table = table.lock();
        table.record(pid).map(|r| field.from_record(r))
    };
    live.or_else(|| store.lock().find(pid).map(|e| field.from_entry(e)))
}
