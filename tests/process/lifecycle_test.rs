/*!
 * Lifecycle Tests
 * Fork, exit, wait, kill and reparenting through the public API
 */

use super::harness::{boot, reap_all, record};
use pretty_assertions::assert_eq;
use sched_kernel::{
    KernelConfig, Pid, ProcessError, ProcessState, SchedulingPolicy, TimingField, WaitChannel,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[test]
fn test_wait_returns_child_and_metrics_outlive_the_slot() {
    let child = record::<Pid>();
    let sink = child.clone();

    let (kernel, _) = boot(KernelConfig::default(), move |ctx| {
        let pid = ctx.fork(|ctx| ctx.burn(5))?;
        let reaped = ctx.wait()?;
        sink.lock().push(pid);
        sink.lock().push(reaped);
        Ok(())
    });

    let child = child.lock().clone();
    assert_eq!(child[0], child[1]);
    let pid = child[0];

    assert!(kernel.timing(pid, TimingField::CompletionTime).is_some());
    assert!(kernel.timing(pid, TimingField::TotalRunTime).unwrap_or(0) >= 5);
    assert!(kernel.metrics_entries().iter().any(|e| e.pid == pid));
    assert_eq!(kernel.tickets(pid), None);
}

#[test]
fn test_timing_is_unchanged_by_reclaim() {
    let readings = record::<Vec<Option<u64>>>();
    let sink = readings.clone();

    boot(KernelConfig::default(), move |ctx| {
        let pid = ctx.fork(|ctx| ctx.burn(3))?;
        ctx.burn(1)?;

        // One core: while this body runs, the zombie child is off its core
        let is_zombie = |ctx: &sched_kernel::ProcContext| {
            ctx.kernel()
                .procdump()
                .iter()
                .any(|info| info.pid == pid && info.state == ProcessState::Zombie)
        };
        while !is_zombie(ctx) {
            ctx.yield_now();
        }

        let read = |ctx: &sched_kernel::ProcContext| -> Vec<Option<u64>> {
            TimingField::ALL
                .iter()
                .map(|field| ctx.kernel().timing(pid, *field))
                .collect()
        };
        let before = read(ctx);
        let reaped = ctx.wait()?;
        let after = read(ctx);

        let mut sink = sink.lock();
        sink.push(vec![Some(u64::from(pid)), Some(u64::from(reaped))]);
        sink.push(before);
        sink.push(after);
        Ok(())
    });

    let readings = readings.lock();
    assert_eq!(readings.len(), 3);
    assert_eq!(readings[0][0], readings[0][1]);
    assert!(readings[1].iter().all(Option::is_some), "{:?}", readings[1]);
    assert!(readings[1][2].unwrap_or(0) > 0);
    assert_eq!(readings[1], readings[2]);
}

#[test]
fn test_wait_without_children_fails() {
    let outcome = record::<Result<Pid, ProcessError>>();
    let sink = outcome.clone();

    boot(KernelConfig::default(), move |ctx| {
        sink.lock().push(ctx.wait());
        Ok(())
    });

    let outcome = outcome.lock();
    assert!(matches!(outcome[0], Err(ProcessError::NoChildren(_))));
}

#[test]
fn test_orphans_are_reaped_by_root() {
    let pids = record::<Pid>();
    let reaped = record::<Pid>();
    let (pid_sink, reaped_sink) = (pids.clone(), reaped.clone());

    boot(KernelConfig::default(), move |ctx| {
        let grandchildren = pid_sink.clone();
        let child = ctx.fork_named("parent", move |ctx| {
            let pid = ctx.fork_named("orphan", |ctx| ctx.sleep(5))?;
            grandchildren.lock().push(pid);
            Ok(())
        })?;
        pid_sink.lock().push(child);
        reaped_sink.lock().extend(reap_all(ctx));
        Ok(())
    });

    let mut pids = pids.lock().clone();
    let mut reaped = reaped.lock().clone();
    pids.sort_unstable();
    reaped.sort_unstable();
    assert_eq!(pids.len(), 2);
    assert_eq!(reaped, pids);
}

#[test]
fn test_kill_wakes_a_sleeping_child() {
    let outcome = record::<Result<(), ProcessError>>();
    let sink = outcome.clone();

    boot(KernelConfig::default(), move |ctx| {
        let pid = ctx.fork(move |ctx| {
            let result = ctx.sleep(1_000_000);
            sink.lock().push(result.clone());
            result
        })?;
        ctx.sleep(2)?;
        ctx.kill(pid)?;
        ctx.wait()?;
        Ok(())
    });

    let outcome = outcome.lock();
    assert_eq!(outcome.len(), 1);
    assert!(matches!(outcome[0], Err(ProcessError::Killed(_))));
}

#[test]
fn test_kill_before_first_run_skips_the_body() {
    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();

    boot(KernelConfig::default(), move |ctx| {
        let pid = ctx.fork(move |_| {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })?;
        ctx.kill(pid)?;
        ctx.wait()?;
        Ok(())
    });

    assert!(!ran.load(Ordering::SeqCst));
}

#[test]
fn test_kill_unknown_pid_fails() {
    let outcome = record::<Result<(), ProcessError>>();
    let sink = outcome.clone();

    boot(KernelConfig::default(), move |ctx| {
        sink.lock().push(ctx.kill(9_999));
        Ok(())
    });

    assert_eq!(outcome.lock()[0], Err(ProcessError::NotFound(9_999)));
}

#[test]
fn test_panicking_body_is_still_reaped() {
    let reaped = record::<Pid>();
    let sink = reaped.clone();

    boot(KernelConfig::default(), move |ctx| {
        ctx.fork(|_| panic!("body failure"))?;
        sink.lock().extend(reap_all(ctx));
        Ok(())
    });

    assert_eq!(reaped.lock().len(), 1);
}

#[test]
fn test_wait_on_user_channel_until_wakeup() {
    let woken = record::<usize>();
    let sink = woken.clone();

    boot(KernelConfig::default(), move |ctx| {
        ctx.fork(|ctx| ctx.wait_on(WaitChannel::User(7)))?;
        ctx.sleep(2)?;
        sink.lock().push(ctx.wakeup(WaitChannel::User(7)).count());
        ctx.wait()?;
        Ok(())
    });

    assert_eq!(woken.lock()[0], 1);
}

#[test]
fn test_concurrent_forks_compete_for_the_last_slot() {
    let outcomes = record::<Result<Pid, ProcessError>>();
    let released = Arc::new(AtomicBool::new(false));

    let (sink, gate) = (outcomes.clone(), released.clone());
    boot(
        KernelConfig::default().with_cpus(2).with_capacity(4),
        move |ctx| {
            for _ in 0..2 {
                let (sink, gate) = (sink.clone(), gate.clone());
                ctx.fork(move |ctx| {
                    while !gate.load(Ordering::SeqCst) {
                        ctx.sleep(1)?;
                    }
                    let result = ctx.fork(|ctx| ctx.wait_on(WaitChannel::User(1)));
                    sink.lock().push(result);
                    Ok(())
                })?;
            }
            gate.store(true, Ordering::SeqCst);
            ctx.sleep(20)?;
            Ok(())
        },
    );

    let outcomes = outcomes.lock();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|r| *r == Err(ProcessError::TableFull { capacity: 4 })));
}

#[test]
fn test_procdump_lists_live_records() {
    let listing = record::<(Pid, ProcessState, String)>();
    let sink = listing.clone();

    boot(
        KernelConfig::default().with_policy(SchedulingPolicy::Fifo),
        move |ctx| {
            let pid = ctx.fork_named("idler", |ctx| ctx.wait_on(WaitChannel::User(3)))?;
            ctx.sleep(1)?;
            for info in ctx.kernel().procdump() {
                sink.lock().push((info.pid, info.state, info.name));
            }
            ctx.kill(pid)?;
            ctx.wait()?;
            Ok(())
        },
    );

    let listing = listing.lock();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].1, ProcessState::Running);
    assert_eq!(listing[1].1, ProcessState::Sleeping);
    assert_eq!(listing[1].2, "idler");
}
