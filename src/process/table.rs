/*!
 * Process Table
 *
 * Fixed-capacity arena of process records plus the state machine that
 * moves them between Unused, Embryo, Runnable, Running, Sleeping and Zombie.
 * The kernel wraps the table in a single mutex; every method here therefore
 * runs with the table lock held.
 */

use super::record::ProcRecord;
use super::types::{ProcInfo, ProcessState};
use crate::core::limits::FIRST_PID;
use crate::core::sync::{WaitChannel, WaitRegistry, WakeResult};
use crate::core::types::{Pid, SlotIndex, Ticks, Tickets};
use log::debug;
use std::collections::VecDeque;
use std::thread::JoinHandle;

/// Process table arena
#[derive(Debug)]
pub struct ProcTable {
    slots: Vec<ProcRecord>,
    next_pid: Pid,
    default_tickets: Tickets,
    waiters: WaitRegistry,
    /// Records in the ready set, in arrival order
    arrival: VecDeque<SlotIndex>,
    root: Option<SlotIndex>,
}

impl ProcTable {
    pub fn new(capacity: usize, default_tickets: Tickets) -> Self {
        assert!(default_tickets > 0, "default tickets must be positive");
        Self {
            slots: (0..capacity).map(|_| ProcRecord::default()).collect(),
            next_pid: FIRST_PID,
            default_tickets,
            waiters: WaitRegistry::new(),
            arrival: VecDeque::with_capacity(capacity),
            root: None,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots not Unused
    pub fn live(&self) -> usize {
        self.slots
            .iter()
            .filter(|r| r.state != ProcessState::Unused)
            .count()
    }

    #[inline]
    pub fn default_tickets(&self) -> Tickets {
        self.default_tickets
    }

    /// Reserve the first Unused slot for a new identity
    ///
    /// Returns `None` when the table is full.
    pub fn allocate(&mut self, now: Ticks, name: &str, parent: Option<SlotIndex>) -> Option<(SlotIndex, Pid)> {
        let index = self
            .slots
            .iter()
            .position(|r| r.state == ProcessState::Unused)?;

        let pid = self.next_pid;
        self.next_pid += 1;
        self.slots[index].claim(pid, name, parent, self.default_tickets, now);

        debug!("allocated pid {} in slot {}", pid, index);
        Some((SlotIndex(index), pid))
    }

    /// Undo an allocation that never became runnable
    pub fn release(&mut self, slot: SlotIndex) {
        let record = &mut self.slots[slot.0];
        assert_eq!(
            record.state,
            ProcessState::Embryo,
            "release: pid {} is not an embryo",
            record.pid
        );
        debug!("released embryo pid {} from slot {}", record.pid, slot.0);
        record.reset();
    }

    #[inline]
    pub fn get(&self, slot: SlotIndex) -> &ProcRecord {
        &self.slots[slot.0]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, slot: SlotIndex) -> &mut ProcRecord {
        &mut self.slots[slot.0]
    }

    /// Slot of the live record with `pid`
    pub fn find(&self, pid: Pid) -> Option<SlotIndex> {
        if pid == 0 {
            return None;
        }
        self.slots
            .iter()
            .position(|r| r.state != ProcessState::Unused && r.pid == pid)
            .map(SlotIndex)
    }

    /// Live record with `pid`
    pub fn record(&self, pid: Pid) -> Option<&ProcRecord> {
        self.find(pid).map(|slot| self.get(slot))
    }

    /// All slots in table order
    pub fn iter(&self) -> impl Iterator<Item = (SlotIndex, &ProcRecord)> {
        self.slots.iter().enumerate().map(|(i, r)| (SlotIndex(i), r))
    }

    /// Live children of `parent`, in table order
    pub fn children(&self, parent: SlotIndex) -> Vec<SlotIndex> {
        self.iter()
            .filter(|(_, r)| r.state != ProcessState::Unused && r.parent == Some(parent))
            .map(|(slot, _)| slot)
            .collect()
    }

    pub fn set_root(&mut self, slot: SlotIndex) {
        self.root = Some(slot);
    }

    #[inline]
    pub fn root(&self) -> Option<SlotIndex> {
        self.root
    }

    /// Records in the ready set in arrival order
    pub fn arrival_order(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        self.arrival.iter().copied()
    }

    /// Embryo or Sleeping → Runnable, joining the tail of the arrival order
    pub(crate) fn make_runnable(&mut self, slot: SlotIndex, now: Ticks) {
        let record = &mut self.slots[slot.0];
        debug_assert!(
            matches!(record.state, ProcessState::Embryo | ProcessState::Sleeping),
            "make_runnable from {:?}",
            record.state
        );
        record.state = ProcessState::Runnable;
        record.wait_channel = None;
        record.timing.enqueue_time = Some(now);
        if !self.arrival.contains(&slot) {
            self.arrival.push_back(slot);
        }
    }

    /// Running → Runnable; the record keeps its arrival position
    pub(crate) fn preempt(&mut self, slot: SlotIndex, now: Ticks) {
        let record = &mut self.slots[slot.0];
        record.state = ProcessState::Runnable;
        record.timing.enqueue_time = Some(now);
    }

    /// Running → Sleeping on `channel`; leaves the ready set
    pub(crate) fn sleep(&mut self, slot: SlotIndex, channel: WaitChannel, now: Ticks) {
        let record = &mut self.slots[slot.0];
        record.flush_ready_time(now);
        record.wait_channel = Some(channel);
        record.state = ProcessState::Sleeping;
        self.waiters.register(channel, slot);
        self.arrival.retain(|s| *s != slot);
    }

    /// Promote every record sleeping on `channel` (broadcast)
    pub fn wake(&mut self, channel: WaitChannel, now: Ticks) -> WakeResult {
        let mut woken = 0;
        for slot in self.waiters.take(channel) {
            let record = &self.slots[slot.0];
            if record.state == ProcessState::Sleeping && record.wait_channel == Some(channel) {
                self.make_runnable(slot, now);
                woken += 1;
            }
        }
        WakeResult::from_count(woken)
    }

    pub fn has_waiters(&self, channel: WaitChannel) -> bool {
        self.waiters.has_waiters(channel)
    }

    /// Flag `pid` killed; a sleeping target is made runnable so it can notice
    pub fn kill(&mut self, pid: Pid, now: Ticks) -> bool {
        let Some(slot) = self.find(pid) else {
            return false;
        };
        let record = &mut self.slots[slot.0];
        record.killed = true;
        if record.state == ProcessState::Sleeping {
            if let Some(channel) = record.wait_channel {
                self.waiters.remove(channel, slot);
            }
            self.make_runnable(slot, now);
        }
        true
    }

    /// Running → Zombie; leaves the ready set
    pub(crate) fn exit(&mut self, slot: SlotIndex) {
        let record = &mut self.slots[slot.0];
        record.state = ProcessState::Zombie;
        record.wait_channel = None;
        self.arrival.retain(|s| *s != slot);
    }

    /// Hand every child of `slot` to `new_parent`
    ///
    /// Returns true if any of them is already a zombie.
    pub(crate) fn reparent_children(&mut self, slot: SlotIndex, new_parent: SlotIndex) -> bool {
        let mut zombie = false;
        for record in self.slots.iter_mut() {
            if record.state != ProcessState::Unused && record.parent == Some(slot) {
                record.parent = Some(new_parent);
                zombie |= record.state == ProcessState::Zombie;
            }
        }
        zombie
    }

    /// Zombie → Unused, returning the pid and the context thread to join
    pub(crate) fn reclaim(&mut self, slot: SlotIndex) -> (Pid, Option<JoinHandle<()>>) {
        let record = &mut self.slots[slot.0];
        assert_eq!(
            record.state,
            ProcessState::Zombie,
            "reclaim: pid {} is not a zombie",
            record.pid
        );
        let pid = record.pid;
        let thread = record.reset();
        (pid, thread)
    }

    /// Pid of the record in `slot`'s parent slot
    pub fn parent_pid(&self, slot: SlotIndex) -> Option<Pid> {
        self.slots[slot.0].parent.map(|p| self.slots[p.0].pid)
    }

    /// Listing of every non-Unused record
    pub fn procdump(&self) -> Vec<ProcInfo> {
        self.iter()
            .filter(|(_, r)| r.state != ProcessState::Unused)
            .map(|(slot, r)| r.info(self.parent_pid(slot)))
            .collect()
    }
}
