/*!
 * Syscall Executor
 * Maps each call onto the kernel and encodes the result as an i64
 */

use super::types::Syscall;
use crate::core::limits::SYSCALL_ERROR;
use crate::core::types::Ticks;
use crate::monitoring::SyscallSpan;
use crate::process::context::ProcContext;
use tracing::debug;

/// Execute `call` on behalf of the process behind `ctx`
pub fn dispatch(ctx: &ProcContext, call: Syscall) -> i64 {
    let span = SyscallSpan::new(call.name(), ctx.pid());
    let kernel = ctx.kernel();

    let ret = if let Some((pid, field)) = call.timing_field() {
        encode(kernel.timing(pid, field))
    } else {
        match call {
            Syscall::GetPid => i64::from(ctx.pid()),
            Syscall::Uptime => ticks(kernel.now()),
            Syscall::GetTickets { pid } => encode(kernel.tickets(pid).map(u64::from)),
            Syscall::SetTickets { tickets } => status(ctx.set_tickets(tickets).is_ok()),
            Syscall::TicksRun { pid } => encode(kernel.run_ticks(pid)),
            Syscall::Kill { pid } => status(kernel.kill(pid).is_ok()),
            Syscall::Sleep { ticks } => match u64::try_from(ticks) {
                Ok(ticks) => status(ctx.sleep(ticks).is_ok()),
                Err(_) => SYSCALL_ERROR,
            },
            Syscall::GetCreationTime { .. }
            | Syscall::GetStartTime { .. }
            | Syscall::GetCompletionTime { .. }
            | Syscall::GetTotalRunTime { .. }
            | Syscall::GetTotalReadyTime { .. } => SYSCALL_ERROR,
        }
    };

    span.record_return(ret);
    if ret == SYSCALL_ERROR {
        debug!(syscall = call.name(), pid = ctx.pid(), "syscall failed");
    }
    ret
}

#[inline]
fn ticks(value: Ticks) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[inline]
fn encode(value: Option<Ticks>) -> i64 {
    value.map_or(SYSCALL_ERROR, ticks)
}

#[inline]
fn status(ok: bool) -> i64 {
    if ok {
        0
    } else {
        SYSCALL_ERROR
    }
}
