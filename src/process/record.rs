/*!
 * Process Record
 * A single control block in the process table arena
 */

use super::types::{ProcInfo, ProcessState, Timing};
use crate::core::sync::{Handoff, WaitChannel};
use crate::core::types::{CoreId, Pid, SlotIndex, Ticks, Tickets};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Process control record
///
/// Only reachable through `&ProcTable`/`&mut ProcTable`, i.e. with the table
/// lock held.
#[derive(Debug, Default)]
pub struct ProcRecord {
    pub(crate) pid: Pid,
    pub(crate) state: ProcessState,
    pub(crate) name: String,
    pub(crate) parent: Option<SlotIndex>,
    pub(crate) tickets: Tickets,
    pub(crate) killed: bool,
    pub(crate) timing: Timing,
    pub(crate) run_ticks: Ticks,
    pub(crate) wait_channel: Option<WaitChannel>,
    /// Core that currently owns this record's context
    pub(crate) on_cpu: Option<CoreId>,
    pub(crate) metrics_captured: bool,
    pub(crate) context: Option<Arc<Handoff>>,
    /// Execution context thread; stands in for the kernel stack
    pub(crate) thread: Option<JoinHandle<()>>,
}

impl ProcRecord {
    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    #[inline]
    pub fn state(&self) -> ProcessState {
        self.state
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn parent(&self) -> Option<SlotIndex> {
        self.parent
    }

    #[inline]
    pub fn tickets(&self) -> Tickets {
        self.tickets
    }

    #[inline]
    pub fn killed(&self) -> bool {
        self.killed
    }

    #[inline]
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    #[inline]
    pub fn run_ticks(&self) -> Ticks {
        self.run_ticks
    }

    #[inline]
    pub fn wait_channel(&self) -> Option<WaitChannel> {
        self.wait_channel
    }

    #[inline]
    pub fn on_cpu(&self) -> Option<CoreId> {
        self.on_cpu
    }

    #[inline]
    pub fn metrics_captured(&self) -> bool {
        self.metrics_captured
    }

    /// Runnable and not still owned by a core
    #[inline]
    pub fn is_dispatchable(&self) -> bool {
        self.state == ProcessState::Runnable && self.on_cpu.is_none()
    }

    /// Move a pending ready interval into `total_ready_time`
    pub(crate) fn flush_ready_time(&mut self, now: Ticks) {
        if let Some(enqueued) = self.timing.enqueue_time.take() {
            self.timing.total_ready_time += now.saturating_sub(enqueued);
        }
    }

    /// Fresh identity in a previously Unused slot
    pub(crate) fn claim(&mut self, pid: Pid, name: &str, parent: Option<SlotIndex>, tickets: Tickets, now: Ticks) {
        *self = Self {
            pid,
            state: ProcessState::Embryo,
            name: name.to_owned(),
            parent,
            tickets,
            timing: Timing::created_at(now),
            ..Self::default()
        };
    }

    /// Return the slot to Unused, handing back the context thread if any
    pub(crate) fn reset(&mut self) -> Option<JoinHandle<()>> {
        let thread = self.thread.take();
        *self = Self::default();
        thread
    }

    pub(crate) fn info(&self, parent_pid: Option<Pid>) -> ProcInfo {
        ProcInfo {
            pid: self.pid,
            name: self.name.clone(),
            state: self.state,
            tickets: self.tickets,
            parent: parent_pid,
            killed: self.killed,
            run_ticks: self.run_ticks,
        }
    }
}
