/*!
 * Process Exit
 * Termination of ordinary processes and shutdown through the root
 */

use super::wait;
use crate::core::errors::ProcessError;
use crate::core::sync::WaitChannel;
use crate::core::types::Pid;
use crate::metrics;
use crate::process::context::ProcContext;
use crate::process::ProcessState;
use log::{debug, info, warn};

/// Exit the calling process: it becomes a zombie and never runs again
///
/// # Panics
///
/// If the caller is the root process.
pub fn terminate(ctx: &ProcContext) {
    let kernel = ctx.kernel();
    let slot = ctx.slot();
    kernel.files().close_all(ctx.pid());

    {
        let mut table = kernel.table().lock();
        let root = table.root();
        assert!(root != Some(slot), "terminate: root process {} exiting", ctx.pid());

        let now = kernel.now();
        metrics::finalize(table.get_mut(slot), now);

        if let Some(parent) = table.parent_pid(slot) {
            table.wake(WaitChannel::Process(parent), now);
        }
        if let Some(root) = root {
            if table.reparent_children(slot, root) {
                let root_pid = table.get(root).pid();
                table.wake(WaitChannel::Process(root_pid), now);
            }
        }

        table.exit(slot);
    }
    kernel.notify_work();
    debug!("pid {} exited", ctx.pid());

    ctx.handoff().release();
}

/// Root exit: kill every other process, reap until none remain, halt
pub fn shutdown(ctx: &ProcContext) {
    let kernel = ctx.kernel();
    let slot = ctx.slot();

    let victims: Vec<Pid> = {
        let mut table = kernel.table().lock();
        let now = kernel.now();
        let victims: Vec<Pid> = table
            .iter()
            .filter(|(s, r)| *s != slot && !matches!(r.state(), ProcessState::Unused | ProcessState::Zombie))
            .map(|(_, r)| r.pid())
            .collect();
        for pid in &victims {
            table.kill(*pid, now);
        }
        victims
    };
    kernel.notify_work();
    if !victims.is_empty() {
        info!("shutdown: killed {} remaining processes", victims.len());
    }

    loop {
        match wait::collect(ctx, false) {
            Ok(pid) => debug!("shutdown: reaped pid {}", pid),
            Err(ProcessError::NoChildren(_)) => break,
            Err(err) => {
                warn!("shutdown: stopped reaping: {}", err);
                break;
            }
        }
    }

    kernel.files().close_all(ctx.pid());
    {
        let mut table = kernel.table().lock();
        let now = kernel.now();
        metrics::finalize(table.get_mut(slot), now);
        table.exit(slot);
        kernel.halt();
    }
    info!("shutdown: root process {} done at tick {}", ctx.pid(), kernel.now());

    ctx.handoff().release();
}
