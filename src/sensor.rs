//! Raw lid sensor access
//!
//! `LidStateSource` abstracts the platform's own lid-state query. The shipped
//! implementation reads the `state` files the kernel's button driver publishes
//! under /proc/acpi/button/lid. The base directory is injectable so tests can
//! point it at a temporary tree.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::paths;
use crate::error::{LidwatchError, Result};

/// Binary lid state as reported by hardware or delivered to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LidState {
    Open,
    Closed,
}

impl LidState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LidState::Open => "open",
            LidState::Closed => "closed",
        }
    }
}

impl fmt::Display for LidState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform-supplied raw lid query
///
/// A failed query means the state is unknown. Implementations must be fast
/// and non-blocking; the reconciliation engine calls this while holding its
/// state lock on some paths.
pub trait LidStateSource: Send + Sync {
    fn query_raw(&self) -> Result<LidState>;
}

/// Lid source backed by the kernel's procfs button interface
///
/// Scans the base directory for a device subdirectory carrying a `state`
/// file and parses the first one found.
pub struct ProcfsLidSource {
    base: PathBuf,
}

impl ProcfsLidSource {
    pub fn new() -> Self {
        Self::with_base(paths::LID_PROC_BASE)
    }

    /// Use a custom base directory instead of /proc/acpi/button/lid
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl Default for ProcfsLidSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LidStateSource for ProcfsLidSource {
    fn query_raw(&self) -> Result<LidState> {
        let entries = fs::read_dir(&self.base).map_err(|e| {
            LidwatchError::SensorUnavailable(format!("{}: {}", self.base.display(), e))
        })?;

        for entry in entries.flatten() {
            let state_path = entry.path().join(paths::LID_STATE_FILE);
            if !state_path.is_file() {
                continue;
            }
            let raw = fs::read_to_string(&state_path).map_err(|e| {
                LidwatchError::SensorUnavailable(format!("{}: {}", state_path.display(), e))
            })?;
            return parse_state_file(&raw).ok_or_else(|| {
                LidwatchError::SensorUnavailable(format!(
                    "unrecognized state in {}",
                    state_path.display()
                ))
            });
        }

        Err(LidwatchError::SensorUnavailable(format!(
            "no lid device under {}",
            self.base.display()
        )))
    }
}

/// Parse the kernel's `state:      open` line format
fn parse_state_file(raw: &str) -> Option<LidState> {
    for line in raw.lines() {
        if let Some(value) = line.strip_prefix("state:") {
            return match value.trim() {
                "open" => Some(LidState::Open),
                "closed" => Some(LidState::Closed),
                _ => None,
            };
        }
    }
    None
}
