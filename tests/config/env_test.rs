/*!
 * Environment Configuration Tests
 * Serialized because they mutate process-wide environment variables
 */

use pretty_assertions::assert_eq;
use sched_kernel::{ClockSource, KernelConfig, KernelError, SchedulingPolicy};
use serial_test::serial;

const VARS: [&str; 5] = [
    "KERNEL_SCHED_POLICY",
    "KERNEL_CPUS",
    "KERNEL_NPROC",
    "KERNEL_LOTTERY_SEED",
    "KERNEL_TICK_MICROS",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_overrides() {
    clear_env();
    assert_eq!(KernelConfig::from_env().unwrap(), KernelConfig::default());
}

#[test]
#[serial]
fn test_overrides_are_applied() {
    clear_env();
    std::env::set_var("KERNEL_SCHED_POLICY", "lottery");
    std::env::set_var("KERNEL_CPUS", "2");
    std::env::set_var("KERNEL_NPROC", " 16 ");
    std::env::set_var("KERNEL_LOTTERY_SEED", "99");
    std::env::set_var("KERNEL_TICK_MICROS", "250");

    let config = KernelConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.policy, SchedulingPolicy::Lottery);
    assert_eq!(config.cpus, 2);
    assert_eq!(config.capacity, 16);
    assert_eq!(config.lottery_seed, 99);
    assert_eq!(config.clock, ClockSource::Periodic { period_micros: 250 });
}

#[test]
#[serial]
fn test_unknown_policy_is_rejected() {
    clear_env();
    std::env::set_var("KERNEL_SCHED_POLICY", "shortest_job");
    let result = KernelConfig::from_env();
    clear_env();

    assert!(matches!(result, Err(KernelError::Scheduler(_))));
}

#[test]
#[serial]
fn test_malformed_numbers_are_rejected() {
    clear_env();
    std::env::set_var("KERNEL_CPUS", "many");
    let result = KernelConfig::from_env();
    clear_env();
    assert!(matches!(result, Err(KernelError::Configuration(_))));

    std::env::set_var("KERNEL_CPUS", "0");
    let result = KernelConfig::from_env();
    clear_env();
    assert!(matches!(result, Err(KernelError::Configuration(_))));
}

#[test]
#[serial]
fn test_zero_tick_period_is_rejected() {
    clear_env();
    std::env::set_var("KERNEL_TICK_MICROS", "0");
    let result = KernelConfig::from_env();
    clear_env();
    assert!(matches!(result, Err(KernelError::Configuration(_))));
}
