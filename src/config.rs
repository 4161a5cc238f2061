//! Process-wide lid configuration
//!
//! Two settings live here:
//!
//! - The initial-state policy. Resolved exactly once per process, either by
//!   an explicit [`force_initial_policy`] call made before the first sensor
//!   binds, or by the quirk table the first time a binding asks for it.
//!   Immutable afterwards.
//! - The report interval used by the decay check. Mutable at any time; the
//!   engine reads it on every invocation.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::timing;
use crate::error::{LidwatchError, Result};
use crate::identity::SystemIdentity;
use crate::quirks;

/// How the engine reports the lid state when a sensor first comes up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitialStatePolicy {
    /// Report nothing at startup. Repeats of an unchanged value are
    /// suppressed within the report interval, and stuck-closed firmware gets
    /// a compensating open pulse.
    #[serde(rename = "ignore")]
    Ignore,
    /// Report a synthetic open at startup without consulting the hardware.
    /// For machines whose first notification never arrives and whose raw
    /// query is unreliable at boot.
    #[serde(rename = "open")]
    AssumeOpen,
    /// Trust the hardware's own state query at startup (the default).
    #[serde(rename = "method")]
    QueryMethod,
    /// The lid sensor must not be attached at all.
    #[serde(rename = "disabled")]
    Disabled,
}

impl InitialStatePolicy {
    /// Literal names accepted by [`force_initial_policy`]
    pub const ALLOWED: &'static [&'static str] = &["ignore", "open", "method", "disabled"];

    pub fn as_str(&self) -> &'static str {
        match self {
            InitialStatePolicy::Ignore => "ignore",
            InitialStatePolicy::AssumeOpen => "open",
            InitialStatePolicy::QueryMethod => "method",
            InitialStatePolicy::Disabled => "disabled",
        }
    }
}

impl fmt::Display for InitialStatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InitialStatePolicy {
    type Err = LidwatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ignore" => Ok(InitialStatePolicy::Ignore),
            "open" => Ok(InitialStatePolicy::AssumeOpen),
            "method" => Ok(InitialStatePolicy::QueryMethod),
            "disabled" => Ok(InitialStatePolicy::Disabled),
            _ => Err(LidwatchError::InvalidPolicyName { name: s.to_string() }),
        }
    }
}

static RESOLVED_POLICY: OnceLock<InitialStatePolicy> = OnceLock::new();
static REPORT_INTERVAL_MS: AtomicU64 = AtomicU64::new(timing::DEFAULT_REPORT_INTERVAL_MS);

/// Force the initial-state policy by literal name
///
/// Only valid before the policy has been resolved; once a sensor has bound
/// (or a previous force succeeded) the value is locked for the process
/// lifetime.
pub fn force_initial_policy(name: &str) -> Result<InitialStatePolicy> {
    let policy: InitialStatePolicy = name.parse()?;
    match RESOLVED_POLICY.set(policy) {
        Ok(()) => {
            info!(policy = policy.as_str(), "initial lid state forced");
            Ok(policy)
        }
        Err(_) => {
            let current = RESOLVED_POLICY.get().copied().unwrap_or(policy);
            Err(LidwatchError::PolicyLocked { current: current.as_str() })
        }
    }
}

/// The process-wide initial-state policy, resolving it on first use
///
/// Resolution order: a forced value wins, otherwise the quirk table decides,
/// otherwise the default is `method`.
pub fn resolved_policy(identity: &SystemIdentity) -> InitialStatePolicy {
    *RESOLVED_POLICY.get_or_init(|| {
        let policy = quirks::resolve(identity);
        info!(
            policy = policy.as_str(),
            vendor = %identity.sys_vendor,
            product = %identity.product_name,
            "initial lid state resolved"
        );
        policy
    })
}

/// The policy, if it has been resolved already
pub fn policy_if_resolved() -> Option<InitialStatePolicy> {
    RESOLVED_POLICY.get().copied()
}

/// Current report interval (decay window for repeated reports)
pub fn report_interval() -> Duration {
    Duration::from_millis(REPORT_INTERVAL_MS.load(Ordering::Relaxed))
}

pub fn report_interval_ms() -> u64 {
    REPORT_INTERVAL_MS.load(Ordering::Relaxed)
}

/// Change the report interval; takes effect on the next engine invocation
pub fn set_report_interval_ms(ms: u64) {
    REPORT_INTERVAL_MS.store(ms, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse_and_names() {
        assert_eq!(
            "ignore".parse::<InitialStatePolicy>().unwrap(),
            InitialStatePolicy::Ignore
        );
        assert_eq!(
            "open".parse::<InitialStatePolicy>().unwrap(),
            InitialStatePolicy::AssumeOpen
        );
        assert_eq!(
            "method".parse::<InitialStatePolicy>().unwrap(),
            InitialStatePolicy::QueryMethod
        );
        assert_eq!(
            "disabled".parse::<InitialStatePolicy>().unwrap(),
            InitialStatePolicy::Disabled
        );
        for name in InitialStatePolicy::ALLOWED {
            assert!(name.parse::<InitialStatePolicy>().is_ok());
        }
    }

    #[test]
    fn test_unknown_policy_name_lists_allowed() {
        let err = "bogus".parse::<InitialStatePolicy>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("bogus"));
        for name in InitialStatePolicy::ALLOWED {
            assert!(msg.contains(name), "error should list '{}'", name);
        }
    }

    #[test]
    fn test_policy_serializes_to_literal_names() {
        assert_eq!(
            serde_json::to_string(&InitialStatePolicy::AssumeOpen).unwrap(),
            "\"open\""
        );
        assert_eq!(
            serde_json::to_string(&InitialStatePolicy::QueryMethod).unwrap(),
            "\"method\""
        );
        let parsed: InitialStatePolicy = serde_json::from_str("\"ignore\"").unwrap();
        assert_eq!(parsed, InitialStatePolicy::Ignore);
    }

    #[test]
    fn test_report_interval_tunable() {
        assert_eq!(report_interval_ms(), 500);
        set_report_interval_ms(250);
        assert_eq!(report_interval(), Duration::from_millis(250));
        set_report_interval_ms(500);
    }

    // The resolution lifecycle shares one process-wide OnceLock, so the whole
    // sequence lives in a single test.
    #[test]
    fn test_policy_resolution_lifecycle() {
        let identity = SystemIdentity::from_parts("NoSuchVendor", "NoSuchProduct", "0.0");
        assert_eq!(policy_if_resolved(), None);
        assert_eq!(resolved_policy(&identity), InitialStatePolicy::QueryMethod);
        assert_eq!(policy_if_resolved(), Some(InitialStatePolicy::QueryMethod));

        // Locked now; a later force is rejected, and the rejection names
        // every accepted literal.
        let err = force_initial_policy("open").unwrap_err();
        assert!(matches!(err, LidwatchError::PolicyLocked { current: "method" }));
        let msg = err.to_string();
        for name in InitialStatePolicy::ALLOWED {
            assert!(msg.contains(name), "locked error should list '{}'", name);
        }

        // Unknown names are rejected up front, locked or not.
        assert!(matches!(
            force_initial_policy("bogus").unwrap_err(),
            LidwatchError::InvalidPolicyName { .. }
        ));
    }
}
