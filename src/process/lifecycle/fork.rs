/*!
 * Process Creation
 *
 * Allocation of a record, its collaborator resources and its execution
 * context. A failure at any step unwinds everything acquired before it.
 */

use super::exit;
use crate::core::errors::{ProcessError, ProcessResult};
use crate::core::limits::ROOT_PROCESS_NAME;
use crate::core::sync::Handoff;
use crate::core::types::{Pid, SlotIndex};
use crate::kernel::{panic_message, Kernel};
use crate::process::context::{ProcContext, ProcessBody};
use log::{debug, error, info, warn};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

/// Create a process running `body` as a child of `parent`
///
/// `parent` is `None` only for the root process. Without an explicit name
/// the child inherits its parent's.
pub fn fork(
    kernel: &Arc<Kernel>,
    parent: Option<SlotIndex>,
    name: Option<&str>,
    body: ProcessBody,
) -> ProcessResult<Pid> {
    let (slot, pid, parent_pid, name) = {
        let mut table = kernel.table().lock();
        let parent_pid = match parent {
            Some(parent) => {
                let record = table.get(parent);
                if record.killed() {
                    return Err(ProcessError::Killed(record.pid()));
                }
                Some(record.pid())
            }
            None => None,
        };
        let name = match (name, parent) {
            (Some(name), _) => name.to_owned(),
            (None, Some(parent)) => table.get(parent).name().to_owned(),
            (None, None) => ROOT_PROCESS_NAME.to_owned(),
        };
        let capacity = table.capacity();
        let (slot, pid) = table
            .allocate(kernel.now(), &name, parent)
            .ok_or(ProcessError::TableFull { capacity })?;
        (slot, pid, parent_pid, name)
    };

    if let Err(err) = kernel.memory().clone_space(parent_pid, pid) {
        warn!("fork: address space clone for pid {} failed: {}", pid, err);
        kernel.table().lock().release(slot);
        return Err(err.into());
    }
    kernel.files().dup(parent_pid, pid);

    let handoff = Arc::new(Handoff::new());
    let spawned = thread::Builder::new()
        .name(format!("proc-{}", pid))
        .stack_size(kernel.config().stack_size)
        .spawn({
            let kernel = Arc::clone(kernel);
            let handoff = Arc::clone(&handoff);
            move || trampoline(kernel, slot, pid, handoff, body)
        });

    let thread = match spawned {
        Ok(thread) => thread,
        Err(err) => {
            error!("fork: no execution context for pid {}: {}", pid, err);
            kernel.files().close_all(pid);
            kernel.memory().release_space(pid);
            kernel.table().lock().release(slot);
            return Err(ProcessError::ContextUnavailable(err.to_string()));
        }
    };

    {
        let mut table = kernel.table().lock();
        let record = table.get_mut(slot);
        record.context = Some(handoff);
        record.thread = Some(thread);
        table.make_runnable(slot, kernel.now());
    }
    kernel.notify_work();

    info!("fork: pid {} ({}) created by {:?}", pid, name, parent_pid);
    Ok(pid)
}

/// Entry point of every execution context
///
/// Parks until the first dispatch, runs the body, then exits. Panics in
/// the body are contained here; a panic in the exit path itself is a
/// kernel fault.
fn trampoline(kernel: Arc<Kernel>, slot: SlotIndex, pid: Pid, handoff: Arc<Handoff>, body: ProcessBody) {
    handoff.wait_for_dispatch();
    let ctx = ProcContext::new(kernel, slot, pid, handoff);

    if ctx.killed() {
        debug!("pid {} killed before it first ran", pid);
    } else {
        match panic::catch_unwind(AssertUnwindSafe(|| body(&ctx))) {
            Ok(Ok(())) => debug!("pid {} returned", pid),
            Ok(Err(err)) => info!("pid {} exited: {}", pid, err),
            Err(payload) => error!("pid {} panicked: {}", pid, panic_message(payload.as_ref())),
        }
    }

    let finished = panic::catch_unwind(AssertUnwindSafe(|| {
        if ctx.is_root() {
            exit::shutdown(&ctx)
        } else {
            exit::terminate(&ctx)
        }
    }));
    if let Err(payload) = finished {
        let reason = panic_message(payload.as_ref());
        error!("pid {}: fatal error while exiting: {}", pid, reason);
        ctx.kernel().raise_fault(reason);
        ctx.handoff().release();
    }
}
