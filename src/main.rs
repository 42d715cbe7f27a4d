/*!
 * Scheduler Kernel - Main Entry Point
 *
 * Runs the same mixed workload under every scheduling policy and prints
 * the comparison report (markdown, or JSON with `--json`).
 */

use anyhow::{Context, Result};
use parking_lot::Mutex;
use sched_kernel::{
    init_tracing, ComparisonReport, Kernel, KernelConfig, Pid, PolicyReport, SchedulingPolicy,
};
use std::sync::Arc;
use tracing::info;

/// Tickets of the CPU-bound children
const WORKER_TICKETS: [i64; 3] = [10, 20, 30];

/// Simulated work per CPU-bound child
const WORKER_TICKS: u64 = 40;

/// Ticks the I/O-like child sleeps before its short burst
const SLEEPER_TICKS: u64 = 8;

fn main() -> Result<()> {
    init_tracing();
    let json = std::env::args().skip(1).any(|arg| arg == "--json");

    let base = KernelConfig::from_env().context("invalid kernel configuration")?;
    info!("running workload under {} policies", SchedulingPolicy::ALL.len());

    let mut runs = Vec::with_capacity(SchedulingPolicy::ALL.len());
    for policy in SchedulingPolicy::ALL {
        runs.push(run_workload(base.clone().with_policy(policy))?);
    }

    let report = ComparisonReport::new(runs);
    if json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report.to_markdown());
    }
    Ok(())
}

fn run_workload(config: KernelConfig) -> Result<PolicyReport> {
    let policy = config.policy;
    let kernel = Kernel::new(config)?;
    let children = Arc::new(Mutex::new(Vec::<Pid>::new()));

    let spawned = children.clone();
    let summary = kernel.run(move |ctx| {
        for tickets in WORKER_TICKETS {
            let pid = ctx.fork_named("worker", move |ctx| {
                ctx.set_tickets(tickets)?;
                ctx.burn(WORKER_TICKS)
            })?;
            spawned.lock().push(pid);
        }
        let pid = ctx.fork_named("sleeper", |ctx| {
            ctx.sleep(SLEEPER_TICKS)?;
            ctx.burn(WORKER_TICKS / 4)
        })?;
        spawned.lock().push(pid);

        while ctx.wait().is_ok() {}
        ctx.kernel().procdump();
        Ok(())
    })?;

    let children = children.lock();
    let entries = kernel.metrics_entries();
    let ours = entries.iter().filter(|e| children.contains(&e.pid));
    Ok(PolicyReport::new(policy, summary.uptime, ours))
}
