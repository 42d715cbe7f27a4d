/*!
 * Shared helpers for kernel-level tests
 */

#![allow(dead_code)]

use parking_lot::Mutex;
use sched_kernel::{Kernel, KernelConfig, ProcContext, ProcessResult, RunSummary};
use std::sync::Arc;

/// Values recorded from inside process bodies
///
/// Assertions inside a body would only be logged by the kernel, so tests
/// record what they observe and assert after the run.
pub type Record<T> = Arc<Mutex<Vec<T>>>;

pub fn record<T>() -> Record<T> {
    Arc::new(Mutex::new(Vec::new()))
}

/// Build a kernel from `config` and run `init` as its root process
pub fn boot<F>(config: KernelConfig, init: F) -> (Arc<Kernel>, RunSummary)
where
    F: FnOnce(&ProcContext) -> ProcessResult<()> + Send + 'static,
{
    let kernel = Kernel::new(config).expect("valid configuration");
    let summary = kernel.run(init).expect("kernel run");
    (kernel, summary)
}

/// Reap children until none remain, returning their pids in reap order
pub fn reap_all(ctx: &ProcContext) -> Vec<sched_kernel::Pid> {
    let mut reaped = Vec::new();
    while let Ok(pid) = ctx.wait() {
        reaped.push(pid);
    }
    reaped
}
