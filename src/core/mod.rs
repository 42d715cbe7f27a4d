/*!
 * Core Module
 * Fundamental kernel types, configuration, and error handling
 */

pub mod config;
pub mod errors;
pub mod limits;
pub mod sync;
pub mod types;

// Re-export for convenience
pub use config::{ClockSource, KernelConfig};
pub use errors::*;
pub use types::*;
