/*!
 * Dispatch Bookkeeping
 * Timing updates around a slice, applied with the table lock held
 */

use crate::core::limits::MIN_SLICE_TICKS;
use crate::core::sync::{Handoff, WaitChannel};
use crate::core::types::{CoreId, SlotIndex, Ticks};
use crate::metrics::{self, MetricsStore};
use crate::process::table::ProcTable;
use crate::process::ProcessState;
use log::{debug, trace};
use parking_lot::Mutex;
use std::sync::Arc;

/// Claim `slot` for `core` and return the context baton to resume
///
/// # Panics
///
/// If the record is not dispatchable or has no execution context.
pub fn begin_slice(table: &mut ProcTable, slot: SlotIndex, core: CoreId, now: Ticks) -> Arc<Handoff> {
    let record = table.get_mut(slot);
    assert!(
        record.is_dispatchable(),
        "sched: pid {} is not dispatchable ({}, on_cpu {:?})",
        record.pid,
        record.state,
        record.on_cpu
    );

    if record.timing.start_time.is_none() {
        record.timing.start_time = Some(now);
    }
    record.flush_ready_time(now);
    record.timing.run_start = Some(now);
    record.state = ProcessState::Running;
    record.on_cpu = Some(core);

    trace!("cpu{} dispatch pid {} at tick {}", core, record.pid, now);
    match &record.context {
        Some(context) => context.clone(),
        None => panic!("sched: pid {} has no execution context", record.pid),
    }
}

/// Account the slice that just ended and release the record from its core
///
/// A record that came back as a zombie gets its completion time and its
/// metrics snapshot here, and its parent is woken: the parent's collect
/// skips children still owned by a core.
///
/// # Panics
///
/// If the record handed the core back while still Running.
pub fn end_slice(table: &mut ProcTable, slot: SlotIndex, now: Ticks, store: &Mutex<MetricsStore>) {
    let record = table.get_mut(slot);
    let run_start = record.timing.run_start.take().unwrap_or(now);
    let elapsed = now.saturating_sub(run_start).max(MIN_SLICE_TICKS);
    record.timing.total_run_time += elapsed;
    record.run_ticks += elapsed;
    record.on_cpu = None;

    let state = record.state;
    match state {
        ProcessState::Running => {
            panic!("sched: pid {} gave up the core while running", record.pid)
        }
        ProcessState::Zombie => {
            record.timing.completion_time = Some(now.max(record.timing.creation_time));
            metrics::snapshot(record, &mut store.lock());
            debug!("pid {} left its core for the last time at tick {}", record.pid, now);
            if let Some(parent) = table.parent_pid(slot) {
                table.wake(WaitChannel::Process(parent), now);
            }
        }
        _ => {}
    }
}
