/*!
 * Process Context
 *
 * The handle a running process body uses to talk to the kernel. Every
 * method runs on the process's own execution context while it holds a
 * core; operations that give the core up (yield, sleep, wait) suspend the
 * context until a core dispatches it again.
 */

use super::lifecycle;
use super::table::ProcTable;
use crate::core::errors::{ProcessError, ProcessResult};
use crate::core::sync::{Handoff, WaitChannel, WakeResult};
use crate::core::types::{Pid, SlotIndex, Ticks, Tickets};
use crate::kernel::Kernel;
use crate::syscalls::{self, Syscall};
use log::trace;
use parking_lot::MutexGuard;
use std::fmt;
use std::sync::Arc;

/// Program executed by a process: returning from it is exiting
pub type ProcessBody = Box<dyn FnOnce(&ProcContext) -> ProcessResult<()> + Send + 'static>;

/// Kernel interface of a running process
pub struct ProcContext {
    kernel: Arc<Kernel>,
    slot: SlotIndex,
    pid: Pid,
    handoff: Arc<Handoff>,
}

impl ProcContext {
    pub(crate) fn new(kernel: Arc<Kernel>, slot: SlotIndex, pid: Pid, handoff: Arc<Handoff>) -> Self {
        Self {
            kernel,
            slot,
            pid,
            handoff,
        }
    }

    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    #[inline]
    pub fn kernel(&self) -> &Arc<Kernel> {
        &self.kernel
    }

    #[inline]
    pub(crate) fn slot(&self) -> SlotIndex {
        self.slot
    }

    #[inline]
    pub(crate) fn handoff(&self) -> &Handoff {
        &self.handoff
    }

    pub fn is_root(&self) -> bool {
        self.kernel.table().lock().root() == Some(self.slot)
    }

    /// Create a child running `body`; the child inherits this process's name
    pub fn fork<F>(&self, body: F) -> ProcessResult<Pid>
    where
        F: FnOnce(&ProcContext) -> ProcessResult<()> + Send + 'static,
    {
        lifecycle::fork(&self.kernel, Some(self.slot), None, Box::new(body))
    }

    /// Create a child running `body` under a new debug name
    pub fn fork_named<F>(&self, name: &str, body: F) -> ProcessResult<Pid>
    where
        F: FnOnce(&ProcContext) -> ProcessResult<()> + Send + 'static,
    {
        lifecycle::fork(&self.kernel, Some(self.slot), Some(name), Box::new(body))
    }

    /// Reap one terminated child, sleeping until one exists
    pub fn wait(&self) -> ProcessResult<Pid> {
        lifecycle::collect(self, true)
    }

    /// Give the core up while staying runnable
    pub fn yield_now(&self) {
        {
            let mut table = self.kernel.table().lock();
            table.preempt(self.slot, self.kernel.now());
        }
        self.kernel.notify_work();
        self.handoff.suspend();
    }

    /// Sleep on `channel` with the table guard in hand
    ///
    /// The guard is released while suspended and reacquired before return,
    /// so a wake issued after registration cannot be lost.
    pub(crate) fn sleep_on(&self, table: &mut MutexGuard<'_, ProcTable>, channel: WaitChannel) {
        trace!("pid {} sleeps on {}", self.pid, channel);
        table.sleep(self.slot, channel, self.kernel.now());
        MutexGuard::unlocked(table, || self.handoff.suspend());
    }

    /// Sleep once on `channel` until woken or killed
    pub fn wait_on(&self, channel: WaitChannel) -> ProcessResult<()> {
        let mut table = self.kernel.table().lock();
        if table.get(self.slot).killed() {
            return Err(ProcessError::Killed(self.pid));
        }
        self.sleep_on(&mut table, channel);
        if table.get(self.slot).killed() {
            return Err(ProcessError::Killed(self.pid));
        }
        Ok(())
    }

    /// Wake every process sleeping on `channel`
    pub fn wakeup(&self, channel: WaitChannel) -> WakeResult {
        self.kernel.wakeup(channel)
    }

    /// Sleep until `ticks` timer ticks have elapsed
    pub fn sleep(&self, ticks: Ticks) -> ProcessResult<()> {
        let mut table = self.kernel.table().lock();
        let target = self.kernel.now().saturating_add(ticks);
        while self.kernel.now() < target {
            if table.get(self.slot).killed() {
                return Err(ProcessError::Killed(self.pid));
            }
            self.sleep_on(&mut table, WaitChannel::Ticks);
        }
        Ok(())
    }

    /// Simulate `ticks` ticks of CPU-bound work
    pub fn burn(&self, ticks: Ticks) -> ProcessResult<()> {
        for _ in 0..ticks {
            self.kernel.timer_interrupt();
            self.checkpoint()?;
        }
        Ok(())
    }

    /// Preemption and cancellation point
    ///
    /// Yields if a tick elapsed since this slice began; fails once the
    /// process has been killed.
    pub fn checkpoint(&self) -> ProcessResult<()> {
        let (killed, run_start) = {
            let table = self.kernel.table().lock();
            let record = table.get(self.slot);
            (record.killed(), record.timing().run_start)
        };
        if killed {
            return Err(ProcessError::Killed(self.pid));
        }
        if run_start.map_or(false, |start| self.kernel.now() > start) {
            self.yield_now();
            if self.killed() {
                return Err(ProcessError::Killed(self.pid));
            }
        }
        Ok(())
    }

    pub fn killed(&self) -> bool {
        self.kernel.table().lock().get(self.slot).killed()
    }

    /// Flag another process killed
    pub fn kill(&self, pid: Pid) -> ProcessResult<()> {
        self.kernel.kill(pid)
    }

    /// Replace this process's ticket count
    pub fn set_tickets(&self, tickets: i64) -> ProcessResult<()> {
        let tickets = Tickets::try_from(tickets)
            .ok()
            .filter(|t| *t > 0)
            .ok_or(ProcessError::InvalidTickets(tickets))?;
        let mut table = self.kernel.table().lock();
        table.get_mut(self.slot).tickets = tickets;
        Ok(())
    }

    /// Enter the kernel through the syscall layer
    ///
    /// Syscall return is a cancellation point.
    pub fn syscall(&self, call: Syscall) -> ProcessResult<i64> {
        let ret = syscalls::dispatch(self, call);
        if self.killed() {
            return Err(ProcessError::Killed(self.pid));
        }
        Ok(ret)
    }
}

impl fmt::Debug for ProcContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcContext")
            .field("pid", &self.pid)
            .field("slot", &self.slot)
            .finish()
    }
}
