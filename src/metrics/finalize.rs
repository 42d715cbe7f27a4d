/*!
 * Metrics Finalization
 * Closing out a record's timing fields and freezing them into the store
 */

use super::store::{MetricsEntry, MetricsStore, StoreOutcome};
use crate::core::limits::MIN_SLICE_TICKS;
use crate::core::types::Ticks;
use crate::process::record::ProcRecord;
use log::debug;

/// Close out a terminating record's timing fields. Idempotent.
///
/// A record still on a core gets its final slice (at least one tick)
/// charged when the core lets go of it.
pub fn finalize(record: &mut ProcRecord, now: Ticks) {
    let on_cpu = record.on_cpu.is_some();
    let timing = &mut record.timing;
    match timing.completion_time {
        Some(done) if done >= timing.creation_time => {}
        _ => timing.completion_time = Some(now.max(timing.creation_time)),
    }
    if timing.total_run_time == 0 && !on_cpu {
        timing.total_run_time = MIN_SLICE_TICKS;
    }
    record.flush_ready_time(now);
}

/// Frozen copy of a record's timing fields
pub fn entry_for(record: &ProcRecord) -> MetricsEntry {
    let timing = record.timing();
    MetricsEntry {
        pid: record.pid(),
        creation_time: timing.creation_time,
        start_time: timing.start_time.unwrap_or(0),
        completion_time: timing.completion_time.unwrap_or(0),
        total_run_time: timing.total_run_time,
        total_ready_time: timing.total_ready_time,
    }
}

/// Store the record's metrics unless they were already captured
///
/// The caller holds the table lock (it has `&mut ProcRecord`), so taking the
/// store lock here respects the table → metrics order.
pub fn snapshot(record: &mut ProcRecord, store: &mut MetricsStore) -> Option<StoreOutcome> {
    if record.metrics_captured {
        return None;
    }
    let outcome = store.record(entry_for(record));
    record.metrics_captured = true;
    debug!("captured metrics for pid {} ({:?})", record.pid(), outcome);
    Some(outcome)
}
