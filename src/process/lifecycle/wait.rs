/*!
 * Child Reaping
 */

use crate::core::errors::{ProcessError, ProcessResult};
use crate::core::sync::WaitChannel;
use crate::core::types::Pid;
use crate::metrics;
use crate::process::context::ProcContext;
use crate::process::ProcessState;
use log::{debug, warn};

/// Reclaim one zombie child of the caller
///
/// Children still owned by a core are skipped; the core wakes the parent
/// once it lets go. With `interruptible` a killed caller stops waiting.
pub fn collect(ctx: &ProcContext, interruptible: bool) -> ProcessResult<Pid> {
    let kernel = ctx.kernel();
    let slot = ctx.slot();
    let mut table = kernel.table().lock();

    loop {
        let children = table.children(slot);
        if children.is_empty() {
            return Err(ProcessError::NoChildren(ctx.pid()));
        }

        let reapable = children.into_iter().find(|child| {
            let record = table.get(*child);
            record.state() == ProcessState::Zombie && record.on_cpu().is_none()
        });

        if let Some(child) = reapable {
            metrics::snapshot(table.get_mut(child), &mut kernel.metrics().lock());
            let (pid, thread) = table.reclaim(child);
            drop(table);

            kernel.memory().release_space(pid);
            if let Some(thread) = thread {
                if thread.join().is_err() {
                    warn!("pid {}: execution context ended abnormally", pid);
                }
            }
            debug!("pid {} reaped pid {}", ctx.pid(), pid);
            return Ok(pid);
        }

        if interruptible && table.get(slot).killed() {
            return Err(ProcessError::Killed(ctx.pid()));
        }
        ctx.sleep_on(&mut table, WaitChannel::Process(ctx.pid()));
    }
}
