/*!
 * Context Hand-off
 *
 * Explicit cooperative suspend/resume between a core's scheduler loop and a
 * process execution context. Exactly one side runs at a time: the baton is
 * a turn flag guarded by a parking_lot mutex, with a condvar to park the
 * side that does not hold it.
 */

use parking_lot::{Condvar, Mutex};

/// Whose turn it is to execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// The scheduler loop owns the core
    Scheduler,
    /// The process context owns the core
    Process,
    /// The process context finished and will never run again
    Released,
}

/// Per-record baton shared by the process context and whichever core dispatches it
#[derive(Debug)]
pub struct Handoff {
    turn: Mutex<Turn>,
    changed: Condvar,
}

impl Handoff {
    pub fn new() -> Self {
        Self {
            turn: Mutex::new(Turn::Scheduler),
            changed: Condvar::new(),
        }
    }

    /// Current turn (diagnostics only; may be stale by the time it is read)
    pub fn turn(&self) -> Turn {
        *self.turn.lock()
    }

    /// Scheduler side: give the core to the process and block until it comes back
    ///
    /// Returns the turn observed on return: `Scheduler` after a suspend,
    /// `Released` after the context finished.
    pub fn resume(&self) -> Turn {
        let mut turn = self.turn.lock();
        match *turn {
            Turn::Scheduler => {}
            other => panic!("handoff: resume while context is {:?}", other),
        }
        *turn = Turn::Process;
        self.changed.notify_all();
        while *turn == Turn::Process {
            self.changed.wait(&mut turn);
        }
        *turn
    }

    /// Process side: park until the first dispatch
    pub fn wait_for_dispatch(&self) {
        let mut turn = self.turn.lock();
        while *turn != Turn::Process {
            self.changed.wait(&mut turn);
        }
    }

    /// Process side: hand the core back and park until dispatched again
    pub fn suspend(&self) {
        let mut turn = self.turn.lock();
        debug_assert_eq!(*turn, Turn::Process, "suspend from a context that is not running");
        *turn = Turn::Scheduler;
        self.changed.notify_all();
        while *turn != Turn::Process {
            self.changed.wait(&mut turn);
        }
    }

    /// Process side: hand the core back for the last time
    pub fn release(&self) {
        let mut turn = self.turn.lock();
        *turn = Turn::Released;
        self.changed.notify_all();
    }
}

impl Default for Handoff {
    fn default() -> Self {
        Self::new()
    }
}
