/*!
 * Per-Core Scheduler Loop
 *
 * Each execution core runs this loop on its own thread. The table lock is
 * held while choosing and accounting, and released across the hand-off to
 * the chosen context.
 */

use super::dispatch::{begin_slice, end_slice};
use super::policy;
use super::types::CoreStats;
use crate::core::limits::IDLE_POLL_INTERVAL;
use crate::core::sync::{Turn, WaitChannel};
use crate::core::types::CoreId;
use crate::kernel::Kernel;
use crate::process::table::ProcTable;
use log::{debug, info, warn};
use parking_lot::MutexGuard;

/// Run the scheduler loop of `core` until the kernel halts
pub fn run_core(kernel: &Kernel, core: CoreId) -> CoreStats {
    let config = kernel.config();
    let mut strategy = policy::for_core(config.policy, config.lottery_seed, core);
    let mut stats = CoreStats::default();

    info!("cpu{}: scheduler started ({})", core, strategy.policy());

    let mut table = kernel.table().lock();
    loop {
        if let Some(reason) = kernel.fault() {
            warn!("cpu{}: stopping after fault: {}", core, reason);
            break;
        }

        let Some(slot) = strategy.pick_next(&table) else {
            if kernel.is_halted() {
                break;
            }
            stats.idle_passes += 1;
            idle(kernel, &mut table);
            continue;
        };

        stats.dispatches += 1;
        let context = begin_slice(&mut table, slot, core, kernel.now());
        let turn = MutexGuard::unlocked(&mut table, || context.resume());

        if kernel.fault().is_some() {
            continue;
        }
        end_slice(&mut table, slot, kernel.now(), kernel.metrics());
        if turn == Turn::Released {
            kernel.notify_work();
        }
    }

    info!(
        "cpu{}: scheduler stopped after {} dispatches ({} idle passes)",
        core, stats.dispatches, stats.idle_passes
    );
    stats
}

/// Nothing dispatchable: advance a manual clock for timed sleepers, or wait for work
fn idle(kernel: &Kernel, table: &mut MutexGuard<'_, ProcTable>) {
    let in_flight = table.iter().any(|(_, r)| r.on_cpu().is_some());
    if kernel.config().clock.is_manual() && !in_flight && table.has_waiters(WaitChannel::Ticks) {
        let now = kernel.tick_locked(table);
        debug!("idle tick {}", now);
        return;
    }
    kernel.wait_for_work(table, IDLE_POLL_INTERVAL);
}
