/*!
 * Address Space Collaborator
 * Cloned on fork, torn down when the parent reclaims the child
 */

use crate::core::errors::MemoryError;
use crate::core::types::Pid;
use ahash::AHashSet;
use log::debug;
use parking_lot::Mutex;

/// Address-space management seen from the process lifecycle
#[cfg_attr(test, mockall::automock)]
pub trait AddressSpaces: Send + Sync {
    /// Give `child` a copy of `parent`'s image (a fresh one for the root)
    fn clone_space(&self, parent: Option<Pid>, child: Pid) -> Result<(), MemoryError>;

    /// Tear down `pid`'s address space
    fn release_space(&self, pid: Pid);

    /// Number of address spaces currently held
    fn live_spaces(&self) -> usize;
}

/// In-process bookkeeping of address spaces with an optional limit
#[derive(Debug, Default)]
pub struct SimulatedMemory {
    spaces: Mutex<AHashSet<Pid>>,
    limit: Option<usize>,
}

impl SimulatedMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse clones once `limit` spaces are live
    pub fn with_limit(limit: usize) -> Self {
        Self {
            spaces: Mutex::new(AHashSet::new()),
            limit: Some(limit),
        }
    }

    pub fn has_space(&self, pid: Pid) -> bool {
        self.spaces.lock().contains(&pid)
    }
}

impl AddressSpaces for SimulatedMemory {
    fn clone_space(&self, parent: Option<Pid>, child: Pid) -> Result<(), MemoryError> {
        let mut spaces = self.spaces.lock();
        if let Some(parent) = parent {
            if !spaces.contains(&parent) {
                return Err(MemoryError::NoAddressSpace(parent));
            }
        }
        if let Some(limit) = self.limit {
            if spaces.len() >= limit {
                return Err(MemoryError::OutOfMemory {
                    live: spaces.len(),
                    limit,
                });
            }
        }
        spaces.insert(child);
        debug!("address space of pid {} cloned from {:?}", child, parent);
        Ok(())
    }

    fn release_space(&self, pid: Pid) {
        if self.spaces.lock().remove(&pid) {
            debug!("address space of pid {} released", pid);
        }
    }

    fn live_spaces(&self) -> usize {
        self.spaces.lock().len()
    }
}
