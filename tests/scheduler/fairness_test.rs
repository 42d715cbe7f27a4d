/*!
 * Lottery Fairness Tests
 * Ticket-proportional CPU shares and seed reproducibility
 */

use super::harness::{boot, reap_all, record};
use pretty_assertions::assert_eq;
use sched_kernel::{KernelConfig, Pid, ProcessError, SchedulingPolicy, Ticks};

const TICKETS: [i64; 3] = [10, 20, 30];

/// Fork three endless CPU-bound children with 10/20/30 tickets, let them
/// compete for `window` ticks, and return their run ticks in fork order
fn compete(seed: u32, window: Ticks) -> Vec<Ticks> {
    let shares = record::<(Pid, Ticks)>();
    let sink = shares.clone();

    boot(
        KernelConfig::default()
            .with_policy(SchedulingPolicy::Lottery)
            .with_seed(seed),
        move |ctx| {
            let mut pids = Vec::new();
            for tickets in TICKETS {
                pids.push(ctx.fork(move |ctx| {
                    ctx.set_tickets(tickets)?;
                    loop {
                        ctx.burn(1)?;
                    }
                })?);
            }

            ctx.sleep(window)?;
            for pid in &pids {
                let ticks = ctx.kernel().run_ticks(*pid).unwrap_or(0);
                sink.lock().push((*pid, ticks));
            }
            for pid in &pids {
                ctx.kill(*pid)?;
            }
            reap_all(ctx);
            Ok(())
        },
    );

    let shares = shares.lock();
    shares.iter().map(|(_, ticks)| *ticks).collect()
}

#[test]
fn test_lottery_shares_follow_tickets() {
    let ticks = compete(7, 3_000);
    assert_eq!(ticks.len(), 3);

    let total: Ticks = ticks.iter().sum();
    let total_tickets: i64 = TICKETS.iter().sum();
    for (observed, tickets) in ticks.iter().zip(TICKETS) {
        let expected = total as f64 * tickets as f64 / total_tickets as f64;
        let deviation = (*observed as f64 - expected).abs() / expected;
        assert!(
            deviation <= 0.15,
            "share for {} tickets off by {:.1}% ({} of {} ticks)",
            tickets,
            deviation * 100.0,
            observed,
            total
        );
    }
    assert!(ticks[0] < ticks[1] && ticks[1] < ticks[2]);
}

#[test]
fn test_lottery_is_reproducible_with_equal_seeds() {
    assert_eq!(compete(42, 300), compete(42, 300));
}

#[test]
fn test_killed_burner_stops_at_next_checkpoint() {
    let outcome = record::<Result<(), ProcessError>>();
    let sink = outcome.clone();

    boot(
        KernelConfig::default().with_policy(SchedulingPolicy::Lottery),
        move |ctx| {
            let pid = ctx.fork(move |ctx| {
                let result = ctx.burn(u64::MAX);
                sink.lock().push(result.clone());
                result
            })?;
            ctx.sleep(5)?;
            ctx.kill(pid)?;
            reap_all(ctx);
            Ok(())
        },
    );

    let outcome = outcome.lock();
    assert_eq!(outcome.len(), 1);
    assert!(matches!(outcome[0], Err(ProcessError::Killed(_))));
}
