//! Constants and configuration defaults for lidwatch
//!
//! Centralizes paths and timing values. Never use magic numbers in other
//! files - add them here first.

/// Kernel-published paths the crate reads from
pub mod paths {
    /// DMI identity directory (vendor/product/BIOS strings)
    pub const DMI_ID_BASE: &str = "/sys/devices/virtual/dmi/id";

    /// Base directory of lid button devices published by the ACPI button
    /// driver. Each device directory carries a `state` file.
    pub const LID_PROC_BASE: &str = "/proc/acpi/button/lid";

    /// Per-device state file name under [`LID_PROC_BASE`]
    pub const LID_STATE_FILE: &str = "state";
}

/// Timing defaults
pub mod timing {
    /// Minimum interval between repeated lid reports before the stream is
    /// considered decayed (stuck firmware), in milliseconds.
    pub const DEFAULT_REPORT_INTERVAL_MS: u64 = 500;
}
