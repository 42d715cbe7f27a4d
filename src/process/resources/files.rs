/*!
 * Descriptor Collaborator
 * Duplicated on fork, closed when a process exits
 */

use crate::core::types::Pid;
use ahash::AHashMap;
use log::debug;
use parking_lot::Mutex;

/// Descriptors every root process starts with (stdin, stdout, stderr)
const STANDARD_DESCRIPTORS: usize = 3;

/// File-descriptor layer seen from the process lifecycle
#[cfg_attr(test, mockall::automock)]
pub trait DescriptorTable: Send + Sync {
    /// Give `child` duplicates of `parent`'s open descriptors
    fn dup(&self, parent: Option<Pid>, child: Pid);

    /// Close every descriptor `pid` holds
    fn close_all(&self, pid: Pid);
}

/// Open-descriptor counts per process
#[derive(Debug, Default)]
pub struct SimulatedFiles {
    open: Mutex<AHashMap<Pid, usize>>,
}

impl SimulatedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open descriptors of `pid` (0 once closed)
    pub fn open_count(&self, pid: Pid) -> usize {
        self.open.lock().get(&pid).copied().unwrap_or(0)
    }
}

impl DescriptorTable for SimulatedFiles {
    fn dup(&self, parent: Option<Pid>, child: Pid) {
        let mut open = self.open.lock();
        let count = match parent {
            Some(parent) => open.get(&parent).copied().unwrap_or(0),
            None => STANDARD_DESCRIPTORS,
        };
        open.insert(child, count);
        debug!("pid {} inherits {} descriptors", child, count);
    }

    fn close_all(&self, pid: Pid) {
        if let Some(count) = self.open.lock().remove(&pid) {
            debug!("closed {} descriptors of pid {}", count, pid);
        }
    }
}
