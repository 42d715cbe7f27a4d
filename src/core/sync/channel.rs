/*!
 * Wait Channels
 *
 * Typed wait keys and the explicit channel → waiters registry that
 * `sleep`/`wake` use. The registry lives inside the process table and is
 * therefore only touched under the table lock.
 */

use crate::core::types::{Pid, SlotIndex};
use ahash::RandomState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identity a sleeping record waits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum WaitChannel {
    /// Events about a process (a parent waiting for its children sleeps on its own pid)
    Process(Pid),
    /// The global tick counter
    Ticks,
    /// Caller-defined channel
    User(u64),
}

impl fmt::Display for WaitChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Process(pid) => write!(f, "process:{}", pid),
            Self::Ticks => f.write_str("ticks"),
            Self::User(key) => write!(f, "user:{}", key),
        }
    }
}

/// Result of a wake operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeResult {
    /// Successfully woke N waiters (N >= 1)
    Woken(usize),
    /// No waiters were waiting
    NoWaiters,
}

impl WakeResult {
    #[inline(always)]
    pub fn is_woken(&self) -> bool {
        matches!(self, WakeResult::Woken(_))
    }

    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            WakeResult::Woken(n) => *n,
            WakeResult::NoWaiters => 0,
        }
    }

    pub(crate) fn from_count(n: usize) -> Self {
        if n == 0 {
            Self::NoWaiters
        } else {
            Self::Woken(n)
        }
    }
}

/// Channel → sleeping slots
#[derive(Debug, Default)]
pub struct WaitRegistry {
    waiters: HashMap<WaitChannel, Vec<SlotIndex>, RandomState>,
}

impl WaitRegistry {
    pub fn new() -> Self {
        Self {
            waiters: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Record that `slot` sleeps on `channel`
    pub fn register(&mut self, channel: WaitChannel, slot: SlotIndex) {
        let list = self.waiters.entry(channel).or_default();
        if !list.contains(&slot) {
            list.push(slot);
        }
    }

    /// Remove every waiter of `channel`, returning them in registration order
    pub fn take(&mut self, channel: WaitChannel) -> Vec<SlotIndex> {
        self.waiters.remove(&channel).unwrap_or_default()
    }

    /// Forget a single waiter (e.g. after it was killed awake)
    pub fn remove(&mut self, channel: WaitChannel, slot: SlotIndex) {
        if let Some(list) = self.waiters.get_mut(&channel) {
            list.retain(|s| *s != slot);
            if list.is_empty() {
                self.waiters.remove(&channel);
            }
        }
    }

    pub fn has_waiters(&self, channel: WaitChannel) -> bool {
        self.waiters.get(&channel).map_or(false, |l| !l.is_empty())
    }

    pub fn waiter_count(&self, channel: WaitChannel) -> usize {
        self.waiters.get(&channel).map_or(0, Vec::len)
    }
}
