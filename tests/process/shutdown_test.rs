/*!
 * Shutdown Tests
 * Root exit, leftover cleanup, clock sources and single-boot
 */

use super::harness::{boot, record};
use pretty_assertions::assert_eq;
use sched_kernel::{ClockSource, Kernel, KernelConfig, KernelError, Pid, WaitChannel};
use std::time::Duration;

#[test]
fn test_root_exit_kills_and_reaps_leftovers() {
    let (kernel, summary) = boot(KernelConfig::default().with_cpus(2), |ctx| {
        ctx.fork_named("spinner", |ctx| loop {
            ctx.burn(1)?;
        })?;
        ctx.fork_named("sleeper", |ctx| ctx.sleep(1_000_000))?;
        ctx.fork_named("waiter", |ctx| ctx.wait_on(WaitChannel::User(11)))?;
        ctx.sleep(3)?;
        Ok(())
    });

    assert_eq!(kernel.live_processes(), 0);
    assert_eq!(kernel.memory_spaces(), 0);
    assert!(kernel.is_halted());
    assert!(summary.uptime >= 3);
    assert_eq!(summary.cores.len(), 2);
}

#[test]
fn test_root_error_still_shuts_down() {
    let (kernel, _) = boot(KernelConfig::default(), |ctx| {
        ctx.fork(|ctx| ctx.sleep(50))?;
        ctx.set_tickets(0)
    });

    assert_eq!(kernel.live_processes(), 0);
}

#[test]
fn test_kernel_runs_at_most_once() {
    let kernel = Kernel::new(KernelConfig::default()).unwrap();
    kernel.run(|_| Ok(())).unwrap();

    let second = kernel.run(|_| Ok(()));
    assert!(matches!(second, Err(KernelError::Halted(_))));
}

#[test]
fn test_periodic_clock_drives_sleepers() {
    let woke_at = record::<u64>();
    let sink = woke_at.clone();

    let config = KernelConfig::default().with_clock(ClockSource::periodic(Duration::from_micros(200)));
    let (_, summary) = boot(config, move |ctx| {
        ctx.fork(move |ctx| {
            ctx.sleep(5)?;
            sink.lock().push(ctx.kernel().now());
            Ok(())
        })?;
        ctx.wait()?;
        Ok(())
    });

    let woke_at = woke_at.lock();
    assert_eq!(woke_at.len(), 1);
    assert!(woke_at[0] >= 5);
    assert!(summary.uptime >= woke_at[0]);
}

#[test]
fn test_summary_counts_dispatches() {
    let (_, summary) = boot(KernelConfig::default(), |ctx| {
        for _ in 0..3 {
            ctx.fork(|ctx| ctx.burn(2))?;
        }
        while ctx.wait().is_ok() {}
        Ok(())
    });

    assert!(summary.dispatches() >= 4);
    let root: Pid = summary.root;
    assert_eq!(root, 1);
}
