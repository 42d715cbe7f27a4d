/*!
 * Metrics Store
 * Terminal timing data that outlives process records
 */

use crate::core::types::{Pid, Ticks};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Frozen timing data of a terminated process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsEntry {
    pub pid: Pid,
    pub creation_time: Ticks,
    /// 0 if the process never ran
    pub start_time: Ticks,
    pub completion_time: Ticks,
    pub total_run_time: Ticks,
    pub total_ready_time: Ticks,
}

/// What to do with a snapshot when the store is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MetricsOverflow {
    /// Evict the oldest entry to make room
    #[default]
    EvictOldest,
    /// Keep the store as is and discard the new snapshot
    Drop,
}

/// Outcome of recording a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Stored,
    /// Stored after evicting the entry of this pid
    Evicted(Pid),
    Dropped,
}

/// Bounded store of terminal metrics, oldest first
#[derive(Debug)]
pub struct MetricsStore {
    entries: VecDeque<MetricsEntry>,
    capacity: usize,
    overflow: MetricsOverflow,
    evicted: u64,
    dropped: u64,
}

impl MetricsStore {
    pub fn new(capacity: usize, overflow: MetricsOverflow) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            overflow,
            evicted: 0,
            dropped: 0,
        }
    }

    /// Append a snapshot, applying the overflow policy when full
    pub fn record(&mut self, entry: MetricsEntry) -> StoreOutcome {
        if self.entries.len() < self.capacity {
            self.entries.push_back(entry);
            return StoreOutcome::Stored;
        }

        match self.overflow {
            MetricsOverflow::EvictOldest => {
                let old = self.entries.pop_front();
                self.entries.push_back(entry);
                self.evicted += 1;
                let old_pid = old.map_or(0, |e| e.pid);
                warn!(
                    "metrics store full ({} entries): evicted pid {} for pid {}",
                    self.capacity, old_pid, entry.pid
                );
                StoreOutcome::Evicted(old_pid)
            }
            MetricsOverflow::Drop => {
                self.dropped += 1;
                warn!(
                    "metrics store full ({} entries): dropped snapshot of pid {}",
                    self.capacity, entry.pid
                );
                StoreOutcome::Dropped
            }
        }
    }

    /// Linear scan by pid
    pub fn find(&self, pid: Pid) -> Option<&MetricsEntry> {
        self.entries.iter().find(|e| e.pid == pid)
    }

    pub fn entries(&self) -> impl Iterator<Item = &MetricsEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
