/*!
 * Accounting Tests
 * Run/ready time bookkeeping and metrics store capacity
 */

use super::harness::{boot, reap_all, record};
use pretty_assertions::assert_eq;
use sched_kernel::{Kernel, KernelConfig, MetricsOverflow, Pid, SchedulingPolicy, Ticks, TimingField};

#[test]
fn test_run_ticks_grow_while_burning() {
    let samples = record::<Ticks>();
    let sink = samples.clone();

    boot(KernelConfig::default(), move |ctx| {
        ctx.fork(move |ctx| {
            for _ in 0..3 {
                ctx.burn(2)?;
                let ticks = ctx.kernel().run_ticks(ctx.pid()).unwrap_or(0);
                sink.lock().push(ticks);
            }
            Ok(())
        })?;
        ctx.wait()?;
        Ok(())
    });

    let samples = samples.lock();
    assert_eq!(samples.len(), 3);
    assert!(samples.windows(2).all(|w| w[0] < w[1]), "{:?}", *samples);
}

#[test]
fn test_entry_invariants_hold_for_every_child() {
    for policy in SchedulingPolicy::ALL {
        let (kernel, summary) = boot(KernelConfig::default().with_policy(policy), |ctx| {
            for work in [3, 6, 9] {
                ctx.fork(move |ctx| ctx.burn(work))?;
            }
            ctx.fork(|ctx| {
                ctx.sleep(4)?;
                ctx.burn(2)
            })?;
            reap_all(ctx);
            Ok(())
        });

        let entries = kernel.metrics_entries();
        assert_eq!(entries.len(), 5, "{}", policy);
        for entry in entries.into_iter().filter(|e| e.pid != summary.root) {
            assert!(entry.start_time >= entry.creation_time, "{}: {:?}", policy, entry);
            assert!(entry.completion_time >= entry.start_time, "{}: {:?}", policy, entry);
            assert!(entry.completion_time <= summary.uptime, "{}: {:?}", policy, entry);
            assert!(entry.total_run_time >= 1, "{}: {:?}", policy, entry);
        }
    }
}

#[test]
fn test_ready_time_accumulates_under_contention() {
    let pids = record::<Pid>();
    let sink = pids.clone();

    let (kernel, _) = boot(
        KernelConfig::default().with_policy(SchedulingPolicy::RoundRobin),
        move |ctx| {
            for _ in 0..3 {
                let pid = ctx.fork(|ctx| ctx.burn(5))?;
                sink.lock().push(pid);
            }
            reap_all(ctx);
            Ok(())
        },
    );

    let waited: Ticks = pids
        .lock()
        .iter()
        .filter_map(|pid| kernel.timing(*pid, TimingField::TotalReadyTime))
        .sum();
    assert!(waited > 0);
}

/// Stored entries of everything but the root, oldest first
fn stored_children(kernel: &Kernel, root: Pid) -> Vec<Pid> {
    kernel
        .metrics_entries()
        .iter()
        .map(|e| e.pid)
        .filter(|pid| *pid != root)
        .collect()
}

#[test]
fn test_store_evicts_oldest_when_full() {
    let pids = record::<Pid>();
    let sink = pids.clone();

    let config = KernelConfig::default().with_metrics_capacity(3, MetricsOverflow::EvictOldest);
    let (kernel, summary) = boot(config, move |ctx| {
        for _ in 0..4 {
            let pid = ctx.fork(|ctx| ctx.burn(1))?;
            ctx.wait()?;
            sink.lock().push(pid);
        }
        Ok(())
    });

    let pids = pids.lock();
    assert_eq!(stored_children(&kernel, summary.root), pids[2..].to_vec());
    assert_eq!(kernel.metrics_entries().len(), 3);
    assert_eq!(kernel.timing(pids[0], TimingField::CreationTime), None);
}

#[test]
fn test_store_drops_new_entries_when_configured() {
    let pids = record::<Pid>();
    let sink = pids.clone();

    let config = KernelConfig::default().with_metrics_capacity(2, MetricsOverflow::Drop);
    let (kernel, summary) = boot(config, move |ctx| {
        for _ in 0..4 {
            let pid = ctx.fork(|ctx| ctx.burn(1))?;
            ctx.wait()?;
            sink.lock().push(pid);
        }
        Ok(())
    });

    let pids = pids.lock();
    assert_eq!(stored_children(&kernel, summary.root), pids[..2].to_vec());
    assert_eq!(kernel.timing(summary.root, TimingField::CreationTime), None);
}
