//! `overlay_core` — debounced view cache for externally owned entities.
//!
//! No IO, no clocks. Driven by explicit ticks from a single owner.

mod cache;
mod debounce;
mod order;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use cache::ReconciledViewCache;
pub use debounce::PendingReconciliation;
pub use order::SlotOrder;
pub use types::*;

#[cfg(test)]
mod tests;
