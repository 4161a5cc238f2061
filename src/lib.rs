//! Lidwatch Core Library
//!
//! Lid switch state reconciliation for Linux laptops.
//!
//! Laptop lid sensors are physically unreliable: depending on the firmware,
//! reports may be missing, stuck, or contradictory. This crate turns that raw
//! stream into trustworthy open/closed transition events.
//!
//! # Features
//!
//! - **Debounce**: suppresses redundant repeated reports within a tunable
//!   interval (default 500 ms)
//! - **Compensation**: injects a one-shot synthetic `open` pulse when
//!   firmware is stuck reporting `closed`, unblocking consumer state machines
//! - **Quirk Table**: per-machine initial-state policy overrides keyed by DMI
//!   identity, first match wins
//! - **Live Status**: `open`/`closed`/`unsupported` introspection backed by a
//!   fresh hardware query, never the cache
//!
//! # Module Structure
//!
//! - `engine/` - The debounce/compensation state machine
//! - `sensor` - Raw lid query trait and the procfs-backed source
//! - `quirks` - Static DMI quirk table and resolution
//! - `config` - Process-wide policy override and report-interval tunable
//!
//! # Example
//!
//! ```no_run
//! use lidwatch::{EventSink, LidMonitor, LidState, ProcfsLidSource, SystemIdentity};
//!
//! struct Logger;
//!
//! impl EventSink for Logger {
//!     fn notify_on_change(&self, state: LidState) {
//!         println!("lid {}", state);
//!     }
//! }
//!
//! let monitor = LidMonitor::bind(
//!     Box::new(ProcfsLidSource::new()),
//!     Box::new(Logger),
//!     None,
//!     SystemIdentity::current(),
//! )
//! .unwrap();
//! monitor.on_open();
//! ```

// Grouped modules
pub mod engine;

// Standalone modules
pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod quirks;
pub mod sensor;
pub mod sink;
pub mod status;

// Re-export the engine
pub use engine::LidMonitor;

// Re-export configuration surface
pub use config::{
    force_initial_policy, policy_if_resolved, report_interval, report_interval_ms,
    resolved_policy, set_report_interval_ms, InitialStatePolicy,
};

// Re-export error types
pub use error::{LidwatchError, Result};

// Re-export identity and quirk types
pub use identity::SystemIdentity;
pub use quirks::{QuirkEntry, QuirkMatch, LID_QUIRKS};

// Re-export sensor types
pub use sensor::{LidState, LidStateSource, ProcfsLidSource};

// Re-export collaborator traits
pub use sink::{EventSink, WakeSignal};

// Re-export the status surface
pub use status::LidStatus;
