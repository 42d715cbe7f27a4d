/*!
 * Kernel
 *
 * Owner of the process table, the metrics store, the tick counter and the
 * collaborators. Boots the root process and one scheduler thread per core,
 * and receives trap callbacks (timer ticks, wakeups).
 *
 * Lock order: table → metrics. The metrics lock is taken alone or with the
 * table guard already held, never the other way round.
 */

mod builder;

pub use builder::KernelBuilder;

use crate::core::config::{ClockSource, KernelConfig};
use crate::core::errors::{KernelError, ProcessError, ProcessResult};
use crate::core::limits::ROOT_PROCESS_NAME;
use crate::core::sync::{WaitChannel, WakeResult};
use crate::core::types::{KernelResult, Pid, Ticks, Tickets};
use crate::metrics::{self, MetricsEntry, MetricsStore, TimingField};
use crate::process::context::ProcContext;
use crate::process::lifecycle;
use crate::process::resources::{AddressSpaces, DescriptorTable};
use crate::process::table::ProcTable;
use crate::process::types::ProcInfo;
use crate::scheduler::cpu;
use crate::scheduler::{CoreStats, SchedulingPolicy};
use log::{error, info, warn};
use parking_lot::{Condvar, Mutex, MutexGuard};
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Outcome of a completed kernel run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub policy: SchedulingPolicy,
    pub root: Pid,
    /// Tick counter when the last core stopped
    pub uptime: Ticks,
    pub cores: Vec<CoreStats>,
}

impl RunSummary {
    pub fn dispatches(&self) -> u64 {
        self.cores.iter().map(|c| c.dispatches).sum()
    }
}

/// Scheduler kernel instance
pub struct Kernel {
    config: KernelConfig,
    table: Mutex<ProcTable>,
    metrics: Mutex<MetricsStore>,
    clock: AtomicU64,
    /// Signalled (with the table mutex) when a record may have become dispatchable
    work_available: Condvar,
    booted: AtomicBool,
    halted: AtomicBool,
    fault: Mutex<Option<String>>,
    memory: Arc<dyn AddressSpaces>,
    files: Arc<dyn DescriptorTable>,
}

impl Kernel {
    /// Kernel with simulated collaborators
    pub fn new(config: KernelConfig) -> KernelResult<Arc<Self>> {
        KernelBuilder::new().with_config(config).build()
    }

    pub fn builder() -> KernelBuilder {
        KernelBuilder::new()
    }

    fn from_parts(
        config: KernelConfig,
        memory: Arc<dyn AddressSpaces>,
        files: Arc<dyn DescriptorTable>,
    ) -> KernelResult<Self> {
        config.validate()?;
        Ok(Self {
            table: Mutex::new(ProcTable::new(config.capacity, config.default_tickets)),
            metrics: Mutex::new(MetricsStore::new(
                config.metrics_capacity,
                config.metrics_overflow,
            )),
            clock: AtomicU64::new(0),
            work_available: Condvar::new(),
            booted: AtomicBool::new(false),
            halted: AtomicBool::new(false),
            fault: Mutex::new(None),
            memory,
            files,
            config,
        })
    }

    /// Boot `init` as the root process and run every core until it returns
    ///
    /// When the root body returns, the remaining processes are killed and
    /// reaped, and the cores stop. A kernel runs at most once.
    ///
    /// After a kernel fault this returns `KernelError::Halted` without
    /// resuming the contexts that are still parked: their threads stay
    /// blocked for the life of the host process.
    pub fn run<F>(self: &Arc<Self>, init: F) -> KernelResult<RunSummary>
    where
        F: FnOnce(&ProcContext) -> ProcessResult<()> + Send + 'static,
    {
        if self.booted.swap(true, Ordering::SeqCst) {
            return Err(KernelError::Halted("kernel already booted".into()));
        }

        let root = lifecycle::fork(self, None, Some(ROOT_PROCESS_NAME), Box::new(init))?;
        let root_slot = {
            let mut table = self.table.lock();
            let slot = table.find(root).ok_or(ProcessError::NotFound(root))?;
            table.set_root(slot);
            slot
        };

        info!(
            "booting {} core(s) with {} scheduling, root pid {}",
            self.config.cpus, self.config.policy, root
        );

        let timer = match self.config.clock {
            ClockSource::Periodic { period_micros } => {
                Some(self.spawn_timer(Duration::from_micros(period_micros))?)
            }
            ClockSource::Manual => None,
        };

        let mut handles = Vec::with_capacity(self.config.cpus);
        for core in 0..self.config.cpus {
            let kernel = Arc::clone(self);
            let handle = thread::Builder::new()
                .name(format!("cpu-{}", core))
                .spawn(move || {
                    panic::catch_unwind(AssertUnwindSafe(|| cpu::run_core(&kernel, core))).map_err(
                        |payload| {
                            let reason = format!("cpu{}: {}", core, panic_message(payload.as_ref()));
                            kernel.raise_fault(reason.clone());
                            reason
                        },
                    )
                });
            match handle {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    self.raise_fault(format!("cpu{} did not start: {}", core, err));
                    break;
                }
            }
        }

        let mut cores = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(Ok(stats)) = handle.join() {
                cores.push(stats);
            }
        }
        self.halt();
        if let Some(timer) = timer {
            if timer.join().is_err() {
                warn!("timer thread ended abnormally");
            }
        }

        // Contexts still parked in their hand-off are left blocked; their
        // threads are not joined after a fault.
        if let Some(reason) = self.fault() {
            error!("kernel halted: {}", reason);
            return Err(KernelError::Halted(reason));
        }

        let thread = self.table.lock().reclaim(root_slot).1;
        self.memory.release_space(root);
        if let Some(thread) = thread {
            if thread.join().is_err() {
                warn!("pid {}: root execution context ended abnormally", root);
            }
        }

        let summary = RunSummary {
            policy: self.config.policy,
            root,
            uptime: self.now(),
            cores,
        };
        info!(
            "kernel stopped at tick {} after {} dispatches",
            summary.uptime,
            summary.dispatches()
        );
        Ok(summary)
    }

    fn spawn_timer(self: &Arc<Self>, period: Duration) -> KernelResult<JoinHandle<()>> {
        let kernel = Arc::clone(self);
        let handle = thread::Builder::new()
            .name("timer".into())
            .spawn(move || {
                while !kernel.is_halted() && kernel.fault().is_none() {
                    thread::sleep(period);
                    kernel.timer_interrupt();
                }
            })?;
        Ok(handle)
    }

    // =========================================================================
    // Trap layer
    // =========================================================================

    /// Timer tick: advance the clock and wake timed sleepers
    pub fn timer_interrupt(&self) -> Ticks {
        let mut table = self.table.lock();
        self.tick_locked(&mut table)
    }

    pub(crate) fn tick_locked(&self, table: &mut ProcTable) -> Ticks {
        let now = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        if table.wake(WaitChannel::Ticks, now).is_woken() {
            self.work_available.notify_all();
        }
        now
    }

    /// Wake every process sleeping on `channel`
    pub fn wakeup(&self, channel: WaitChannel) -> WakeResult {
        let result = self.table.lock().wake(channel, self.now());
        if result.is_woken() {
            self.work_available.notify_all();
        }
        result
    }

    /// Flag `pid` killed; it exits at its next cancellation point
    pub fn kill(&self, pid: Pid) -> ProcessResult<()> {
        let found = self.table.lock().kill(pid, self.now());
        if !found {
            return Err(ProcessError::NotFound(pid));
        }
        info!("pid {} killed", pid);
        self.work_available.notify_all();
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current tick
    #[inline]
    pub fn now(&self) -> Ticks {
        self.clock.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn tickets(&self, pid: Pid) -> Option<Tickets> {
        metrics::query::tickets(&self.table, pid)
    }

    pub fn run_ticks(&self, pid: Pid) -> Option<Ticks> {
        metrics::query::run_ticks(&self.table, pid)
    }

    pub fn timing(&self, pid: Pid, field: TimingField) -> Option<Ticks> {
        metrics::query::timing(&self.table, &self.metrics, pid, field)
    }

    /// Non-Unused records
    pub fn live_processes(&self) -> usize {
        self.table.lock().live()
    }

    /// Log and return a listing of every live record
    pub fn procdump(&self) -> Vec<ProcInfo> {
        let listing = self.table.lock().procdump();
        for info in &listing {
            info!("{}", info);
        }
        listing
    }

    /// Every stored metrics entry, oldest first
    pub fn metrics_entries(&self) -> Vec<MetricsEntry> {
        self.metrics.lock().entries().copied().collect()
    }

    pub fn memory_spaces(&self) -> usize {
        self.memory.live_spaces()
    }

    // =========================================================================
    // Crate-internal plumbing
    // =========================================================================

    #[inline]
    pub(crate) fn table(&self) -> &Mutex<ProcTable> {
        &self.table
    }

    #[inline]
    pub(crate) fn metrics(&self) -> &Mutex<MetricsStore> {
        &self.metrics
    }

    pub(crate) fn memory(&self) -> &dyn AddressSpaces {
        self.memory.as_ref()
    }

    pub(crate) fn files(&self) -> &dyn DescriptorTable {
        self.files.as_ref()
    }

    pub(crate) fn notify_work(&self) {
        self.work_available.notify_all();
    }

    pub(crate) fn wait_for_work(&self, table: &mut MutexGuard<'_, ProcTable>, timeout: Duration) {
        let _ = self.work_available.wait_for(table, timeout);
    }

    pub(crate) fn halt(&self) {
        self.halted.store(true, Ordering::SeqCst);
        self.work_available.notify_all();
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Record a fatal invariant violation; every core stops at its next pass
    pub(crate) fn raise_fault(&self, reason: String) {
        let mut fault = self.fault.lock();
        if fault.is_none() {
            *fault = Some(reason);
        }
        drop(fault);
        self.work_available.notify_all();
    }

    pub(crate) fn fault(&self) -> Option<String> {
        self.fault.lock().clone()
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
