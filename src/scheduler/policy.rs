/*!
 * Scheduling Strategies
 *
 * Selection of the next record to dispatch. Every strategy is core-local
 * state driven by a read-only view of the process table; the caller holds
 * the table lock for the duration of `pick_next` and the dispatch that
 * follows.
 */

use super::random::Lcg;
use super::types::SchedulingPolicy;
use crate::core::types::{CoreId, SlotIndex};
use crate::process::table::ProcTable;
use log::trace;

/// Selection strategy of a single core
pub trait Strategy: Send {
    /// Policy this strategy implements
    fn policy(&self) -> SchedulingPolicy;

    /// Next dispatchable slot, or `None` for an idle pass
    fn pick_next(&mut self, table: &ProcTable) -> Option<SlotIndex>;
}

/// Build the strategy a core runs for `policy`
///
/// Lottery generators are seeded with `seed + core` so cores draw
/// independent but reproducible sequences.
pub fn for_core(policy: SchedulingPolicy, seed: u32, core: CoreId) -> Box<dyn Strategy> {
    match policy {
        SchedulingPolicy::RoundRobin => Box::new(RoundRobin::new()),
        SchedulingPolicy::Fifo => Box::new(Fifo),
        SchedulingPolicy::Lottery => Box::new(Lottery::new(seed.wrapping_add(core as u32))),
    }
}

/// Slot-order scan resuming after the last dispatched slot
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: usize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }

    fn scan(table: &ProcTable, from: usize) -> Option<SlotIndex> {
        table
            .iter()
            .skip(from)
            .find(|(_, r)| r.is_dispatchable())
            .map(|(slot, _)| slot)
    }
}

impl Strategy for RoundRobin {
    fn policy(&self) -> SchedulingPolicy {
        SchedulingPolicy::RoundRobin
    }

    fn pick_next(&mut self, table: &ProcTable) -> Option<SlotIndex> {
        // A pass ends at the table end; the next pass restarts at slot 0
        let picked = match Self::scan(table, self.cursor) {
            Some(slot) => Some(slot),
            None if self.cursor > 0 => Self::scan(table, 0),
            None => None,
        };
        self.cursor = picked.map_or(0, |slot| slot.get() + 1);
        picked
    }
}

/// First dispatchable record in arrival order
#[derive(Debug, Default)]
pub struct Fifo;

impl Strategy for Fifo {
    fn policy(&self) -> SchedulingPolicy {
        SchedulingPolicy::Fifo
    }

    fn pick_next(&mut self, table: &ProcTable) -> Option<SlotIndex> {
        table
            .arrival_order()
            .find(|slot| table.get(*slot).is_dispatchable())
    }
}

/// Ticket-weighted draw over dispatchable records
#[derive(Debug)]
pub struct Lottery {
    rng: Lcg,
}

impl Lottery {
    pub fn new(seed: u32) -> Self {
        Self { rng: Lcg::new(seed) }
    }

    /// Sum of tickets held by dispatchable records
    pub fn total_tickets(table: &ProcTable) -> u64 {
        table
            .iter()
            .filter(|(_, r)| r.is_dispatchable())
            .map(|(_, r)| u64::from(r.tickets()))
            .sum()
    }

    /// Walk in table order to the record whose cumulative ticket sum first
    /// exceeds `winning`
    pub fn winner(table: &ProcTable, winning: u64) -> Option<SlotIndex> {
        let mut cumulative = 0u64;
        for (slot, record) in table.iter().filter(|(_, r)| r.is_dispatchable()) {
            cumulative += u64::from(record.tickets());
            if cumulative > winning {
                return Some(slot);
            }
        }
        None
    }
}

impl Strategy for Lottery {
    fn policy(&self) -> SchedulingPolicy {
        SchedulingPolicy::Lottery
    }

    fn pick_next(&mut self, table: &ProcTable) -> Option<SlotIndex> {
        let total = Self::total_tickets(table);
        if total == 0 {
            return None;
        }
        let winning = self.rng.range(0, total);
        trace!("lottery draw {} of {} tickets", winning, total);
        Self::winner(table, winning)
    }
}
