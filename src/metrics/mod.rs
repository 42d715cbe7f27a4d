/*!
 * Metrics Subsystem
 * Finalization, capture, and pid-addressed queries of process timing data
 */

pub mod finalize;
pub mod query;
pub mod store;

pub use finalize::{entry_for, finalize, snapshot};
pub use query::TimingField;
pub use store::{MetricsEntry, MetricsOverflow, MetricsStore, StoreOutcome};
