/*!
 * Process Lifecycle Management
 * Creation, exit and reaping of processes
 */

mod exit;
mod fork;
mod wait;

pub use fork::fork;

pub(crate) use exit::{shutdown, terminate};
pub(crate) use wait::collect;
