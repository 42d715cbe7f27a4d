/*!
 * Syscall Dispatch Tests
 * Return-value encoding of every call, issued from inside processes
 */

use super::harness::{boot, record};
use pretty_assertions::assert_eq;
use sched_kernel::{KernelConfig, Pid, ProcessError, Syscall};

/// Run `calls` from the root process and collect the raw return values
fn issue(calls: Vec<Syscall>) -> Vec<i64> {
    let returns = record::<i64>();
    let sink = returns.clone();

    boot(KernelConfig::default(), move |ctx| {
        for call in calls {
            let ret = ctx.syscall(call)?;
            sink.lock().push(ret);
        }
        Ok(())
    });

    let returns = returns.lock().clone();
    returns
}

#[test]
fn test_getpid_and_uptime() {
    let returns = issue(vec![Syscall::GetPid, Syscall::Uptime]);
    assert_eq!(returns, vec![1, 0]);
}

#[test]
fn test_set_tickets_rejects_non_positive_and_oversized_counts() {
    let returns = issue(vec![
        Syscall::SetTickets { tickets: 0 },
        Syscall::SetTickets { tickets: -4 },
        Syscall::SetTickets {
            tickets: i64::from(u32::MAX) + 1,
        },
        Syscall::GetTickets { pid: 1 },
        Syscall::SetTickets { tickets: 25 },
        Syscall::GetTickets { pid: 1 },
    ]);
    assert_eq!(returns, vec![-1, -1, -1, 10, 0, 25]);
}

#[test]
fn test_sleep_rejects_negative_ticks() {
    let returns = issue(vec![
        Syscall::Sleep { ticks: -1 },
        Syscall::Sleep { ticks: 3 },
        Syscall::Uptime,
    ]);
    assert_eq!(&returns[..2], &[-1, 0]);
    assert!(returns[2] >= 3);
}

#[test]
fn test_unknown_pid_queries_fail() {
    let unknown: Pid = 4_242;
    let returns = issue(vec![
        Syscall::GetTickets { pid: unknown },
        Syscall::TicksRun { pid: unknown },
        Syscall::GetCreationTime { pid: unknown },
        Syscall::GetStartTime { pid: unknown },
        Syscall::GetCompletionTime { pid: unknown },
        Syscall::GetTotalRunTime { pid: unknown },
        Syscall::GetTotalReadyTime { pid: unknown },
        Syscall::Kill { pid: unknown },
    ]);
    assert_eq!(returns, vec![-1; 8]);
}

#[test]
fn test_timing_of_a_reaped_child_comes_from_the_store() {
    let returns = record::<(Pid, i64, i64, i64)>();
    let sink = returns.clone();

    boot(KernelConfig::default(), move |ctx| {
        let pid = ctx.fork(|ctx| ctx.burn(4))?;
        ctx.wait()?;
        let run = ctx.syscall(Syscall::GetTotalRunTime { pid })?;
        let done = ctx.syscall(Syscall::GetCompletionTime { pid })?;
        let live = ctx.syscall(Syscall::TicksRun { pid })?;
        sink.lock().push((pid, run, done, live));
        Ok(())
    });

    let (_, run, done, live) = returns.lock()[0];
    assert!(run >= 4);
    assert!(done >= run);
    assert_eq!(live, -1);
}

#[test]
fn test_killing_yourself_fails_on_syscall_return() {
    let outcome = record::<Result<i64, ProcessError>>();
    let sink = outcome.clone();

    boot(KernelConfig::default(), move |ctx| {
        ctx.fork(move |ctx| {
            let result = ctx.syscall(Syscall::Kill { pid: ctx.pid() });
            sink.lock().push(result.clone());
            result.map(|_| ())
        })?;
        ctx.wait()?;
        Ok(())
    });

    assert!(matches!(outcome.lock()[0], Err(ProcessError::Killed(_))));
}

#[test]
fn test_syscalls_round_trip_through_json() {
    let call: Syscall = serde_json::from_str(r#"{"syscall":"get_tickets","pid":3}"#).unwrap();
    assert_eq!(call, Syscall::GetTickets { pid: 3 });
    assert_eq!(call.name(), "gettickets");
}
