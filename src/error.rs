//! Unified error handling for lidwatch
//!
//! A single error type used across the crate, built on thiserror for proper
//! Display and Error trait impls. Nothing in here is fatal: sensor failures
//! degrade to "no event delivered this time" and configuration failures are
//! rejected requests with a descriptive reason.

use crate::config::InitialStatePolicy;

/// Result type alias using LidwatchError
pub type Result<T> = std::result::Result<T, LidwatchError>;

/// Unified error type for all lidwatch operations
#[derive(thiserror::Error, Debug)]
pub enum LidwatchError {
    /// The raw lid query failed. Callers must treat this as "unknown",
    /// never as closed.
    #[error("lid sensor unavailable: {0}")]
    SensorUnavailable(String),

    #[error("unknown lid policy '{name}' (allowed: {})", InitialStatePolicy::ALLOWED.join(", "))]
    InvalidPolicyName { name: String },

    #[error(
        "initial lid policy already resolved to '{current}'; set it before the first sensor binds (allowed: {})",
        InitialStatePolicy::ALLOWED.join(", ")
    )]
    PolicyLocked { current: &'static str },

    #[error("a lid sensor is already bound; only one is authoritative per process")]
    DuplicateSensor,

    #[error("lid sensor disabled by platform quirk")]
    SensorDisabled,
}
