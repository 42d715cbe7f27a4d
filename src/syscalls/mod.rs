/*!
 * Syscalls Module
 * The "syscall entered" route of the trap layer
 */

pub mod executor;
pub mod types;

pub use executor::dispatch;
pub use types::Syscall;
