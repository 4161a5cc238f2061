//! Live status query surface
//!
//! Introspection never reads the engine's cached state; it re-evaluates the
//! raw sensor so the answer cannot lie while the debounce logic is
//! mid-decision. A failed raw query renders as `unsupported`.

use std::fmt;

use crate::error::Result;
use crate::sensor::LidState;

/// Tri-state answer of the status query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LidStatus {
    Open,
    Closed,
    Unsupported,
}

impl LidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LidStatus::Open => "open",
            LidStatus::Closed => "closed",
            LidStatus::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for LidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Result<LidState>> for LidStatus {
    fn from(result: Result<LidState>) -> Self {
        match result {
            Ok(LidState::Open) => LidStatus::Open,
            Ok(LidState::Closed) => LidStatus::Closed,
            Err(_) => LidStatus::Unsupported,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LidwatchError;

    #[test]
    fn test_status_labels() {
        assert_eq!(LidStatus::Open.to_string(), "open");
        assert_eq!(LidStatus::Closed.to_string(), "closed");
        assert_eq!(LidStatus::Unsupported.to_string(), "unsupported");
    }

    #[test]
    fn test_from_query_result() {
        assert_eq!(LidStatus::from(Ok(LidState::Open)), LidStatus::Open);
        assert_eq!(LidStatus::from(Ok(LidState::Closed)), LidStatus::Closed);
        let err: Result<LidState> =
            Err(LidwatchError::SensorUnavailable("gone".to_string()));
        assert_eq!(LidStatus::from(err), LidStatus::Unsupported);
    }
}
