//! System identity gathering
//!
//! Reads the DMI strings the quirk table matches against. The values never
//! change while the process runs, so the sysfs read happens once and is
//! cached.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::constants::paths;

/// Opaque machine identity used for quirk lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemIdentity {
    pub sys_vendor: String,
    pub product_name: String,
    pub bios_version: String,
}

impl SystemIdentity {
    pub fn from_parts(
        sys_vendor: impl Into<String>,
        product_name: impl Into<String>,
        bios_version: impl Into<String>,
    ) -> Self {
        Self {
            sys_vendor: sys_vendor.into(),
            product_name: product_name.into(),
            bios_version: bios_version.into(),
        }
    }

    /// Identity of the running machine, read from DMI sysfs
    ///
    /// Fields the firmware does not populate come back empty, which simply
    /// never matches a non-wildcard quirk field.
    pub fn current() -> &'static SystemIdentity {
        static CACHED: OnceLock<SystemIdentity> = OnceLock::new();
        CACHED.get_or_init(|| SystemIdentity {
            sys_vendor: read_dmi_field("sys_vendor"),
            product_name: read_dmi_field("product_name"),
            bios_version: read_dmi_field("bios_version"),
        })
    }
}

fn read_dmi_field(name: &str) -> String {
    fs::read_to_string(Path::new(paths::DMI_ID_BASE).join(name))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        let id = SystemIdentity::from_parts("LENOVO", "82BG", "ECCN32WW");
        assert_eq!(id.sys_vendor, "LENOVO");
        assert_eq!(id.product_name, "82BG");
        assert_eq!(id.bios_version, "ECCN32WW");
    }
}
