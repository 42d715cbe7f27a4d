/*!
 * Synchronization Primitives
 *
 * - Typed wait channels with an explicit channel → waiters registry
 * - Cooperative context hand-off between scheduler loops and processes
 *
 * The process table and metrics store are each guarded by a
 * `parking_lot::Mutex` owned by the kernel; lock order is always
 * table → metrics.
 */

mod channel;
mod handoff;

pub use channel::{WaitChannel, WaitRegistry, WakeResult};
pub use handoff::{Handoff, Turn};
