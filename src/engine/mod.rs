//! Lid state reconciliation engine
//!
//! Contains the debounce/compensation state machine.

mod reconcile;

pub use reconcile::LidMonitor;
