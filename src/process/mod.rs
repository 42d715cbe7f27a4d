/*!
 * Process Module
 * Process table, lifecycle and the interface running processes use
 */

pub mod context;
pub mod lifecycle;
pub mod record;
pub mod resources;
pub mod table;
pub mod types;

// Re-export for convenience
pub use context::{ProcContext, ProcessBody};
pub use record::ProcRecord;
pub use resources::{AddressSpaces, DescriptorTable, SimulatedFiles, SimulatedMemory};
pub use table::ProcTable;
pub use types::{ProcInfo, ProcessState, Timing};
