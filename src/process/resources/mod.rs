/*!
 * Process Resources
 * Collaborators the lifecycle acquires on fork and releases on exit/reclaim
 */

mod files;
mod memory;

pub use files::{DescriptorTable, SimulatedFiles};
pub use memory::{AddressSpaces, SimulatedMemory};

#[cfg(test)]
pub use files::MockDescriptorTable;
#[cfg(test)]
pub use memory::MockAddressSpaces;
