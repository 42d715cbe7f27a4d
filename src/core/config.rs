/*!
 * Kernel Configuration
 *
 * Runtime configuration chosen once at startup: policy, core count, table
 * and metrics capacity, lottery seed and clock source.
 */

use crate::core::errors::KernelError;
use crate::core::limits::{
    DEFAULT_CONTEXT_STACK_SIZE, DEFAULT_CPUS, DEFAULT_LOTTERY_SEED, DEFAULT_TICKETS,
    MAX_CPUS, MAX_PROCESSES, METRICS_CAPACITY,
};
use crate::core::types::{KernelResult, Tickets};
use crate::metrics::MetricsOverflow;
use crate::scheduler::SchedulingPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where timer ticks come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClockSource {
    /// Ticks advance only through trap-layer calls (deterministic)
    #[default]
    Manual,
    /// A background timer delivers a tick every `period_micros`
    Periodic { period_micros: u64 },
}

impl ClockSource {
    pub fn periodic(period: Duration) -> Self {
        Self::Periodic {
            period_micros: period.as_micros() as u64,
        }
    }

    #[inline]
    pub const fn is_manual(&self) -> bool {
        matches!(self, Self::Manual)
    }
}

/// Kernel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub policy: SchedulingPolicy,
    pub cpus: usize,
    pub capacity: usize,
    pub metrics_capacity: usize,
    pub metrics_overflow: MetricsOverflow,
    pub default_tickets: Tickets,
    pub lottery_seed: u32,
    pub clock: ClockSource,
    pub stack_size: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            policy: SchedulingPolicy::RoundRobin,
            cpus: DEFAULT_CPUS,
            capacity: MAX_PROCESSES,
            metrics_capacity: METRICS_CAPACITY,
            metrics_overflow: MetricsOverflow::EvictOldest,
            default_tickets: DEFAULT_TICKETS,
            lottery_seed: DEFAULT_LOTTERY_SEED,
            clock: ClockSource::Manual,
            stack_size: DEFAULT_CONTEXT_STACK_SIZE,
        }
    }
}

impl KernelConfig {
    pub fn with_policy(mut self, policy: SchedulingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cpus(mut self, cpus: usize) -> Self {
        self.cpus = cpus;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_metrics_capacity(mut self, capacity: usize, overflow: MetricsOverflow) -> Self {
        self.metrics_capacity = capacity;
        self.metrics_overflow = overflow;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.lottery_seed = seed;
        self
    }

    pub fn with_clock(mut self, clock: ClockSource) -> Self {
        self.clock = clock;
        self
    }

    /// Read overrides from the environment on top of the defaults
    ///
    /// - KERNEL_SCHED_POLICY: round_robin | fifo | lottery
    /// - KERNEL_CPUS: number of execution cores
    /// - KERNEL_NPROC: process table capacity
    /// - KERNEL_LOTTERY_SEED: lottery generator seed
    /// - KERNEL_TICK_MICROS: enable a periodic timer with this period
    pub fn from_env() -> KernelResult<Self> {
        let mut config = Self::default();

        if let Ok(policy) = std::env::var("KERNEL_SCHED_POLICY") {
            config.policy = policy.parse()?;
        }
        if let Some(cpus) = env_number::<usize>("KERNEL_CPUS")? {
            config.cpus = cpus;
        }
        if let Some(capacity) = env_number::<usize>("KERNEL_NPROC")? {
            config.capacity = capacity;
        }
        if let Some(seed) = env_number::<u32>("KERNEL_LOTTERY_SEED")? {
            config.lottery_seed = seed;
        }
        if let Some(micros) = env_number::<u64>("KERNEL_TICK_MICROS")? {
            config.clock = ClockSource::Periodic {
                period_micros: micros,
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the kernel cannot honour
    pub fn validate(&self) -> KernelResult<()> {
        if self.cpus == 0 || self.cpus > MAX_CPUS {
            return Err(KernelError::Configuration(format!(
                "cpus must be between 1 and {}, got {}",
                MAX_CPUS, self.cpus
            )));
        }
        if self.capacity == 0 {
            return Err(KernelError::Configuration(
                "process table capacity must be positive".into(),
            ));
        }
        if self.metrics_capacity == 0 {
            return Err(KernelError::Configuration(
                "metrics capacity must be positive".into(),
            ));
        }
        if self.default_tickets == 0 {
            return Err(KernelError::Configuration(
                "default tickets must be positive".into(),
            ));
        }
        if let ClockSource::Periodic { period_micros: 0 } = self.clock {
            return Err(KernelError::Configuration(
                "timer period must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> KernelResult<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| KernelError::Configuration(format!("{} is not a valid number: {}", key, raw))),
        Err(_) => Ok(None),
    }
}
