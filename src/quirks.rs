//! Per-machine lid policy quirks
//!
//! Some machines ship firmware whose lid device misbehaves in a known way, so
//! the generic startup logic gets overridden for them. The table is a static
//! ordered list of DMI matchers; the first entry whose populated fields all
//! match the running machine wins. No match means the default policy: trust
//! the hardware's own state query.

use tracing::debug;

use crate::config::InitialStatePolicy;
use crate::identity::SystemIdentity;

/// DMI field matcher; `None` fields match anything
#[derive(Debug, Clone, Copy)]
pub struct QuirkMatch {
    pub sys_vendor: Option<&'static str>,
    pub product_name: Option<&'static str>,
    pub bios_version: Option<&'static str>,
}

impl QuirkMatch {
    fn matches(&self, identity: &SystemIdentity) -> bool {
        field_matches(self.sys_vendor, &identity.sys_vendor)
            && field_matches(self.product_name, &identity.product_name)
            && field_matches(self.bios_version, &identity.bios_version)
    }
}

fn field_matches(expected: Option<&str>, actual: &str) -> bool {
    expected.map_or(true, |e| e == actual)
}

/// One machine-specific override
#[derive(Debug, Clone, Copy)]
pub struct QuirkEntry {
    pub matches: QuirkMatch,
    pub policy: InitialStatePolicy,
}

/// Keep this list sorted alphabetically by vendor and model
pub const LID_QUIRKS: &[QuirkEntry] = &[
    // GP-electronic T701, lid method reads a floating GPIO
    QuirkEntry {
        matches: QuirkMatch {
            sys_vendor: Some("Insyde"),
            product_name: Some("T701"),
            bios_version: Some("BYT70A.YNCHENG.WIN.007"),
        },
        policy: InitialStatePolicy::Disabled,
    },
    // Nextbook Ares 8A tablet, lid device always reports closed
    QuirkEntry {
        matches: QuirkMatch {
            sys_vendor: Some("Insyde"),
            product_name: Some("CherryTrail"),
            bios_version: Some("M882"),
        },
        policy: InitialStatePolicy::Disabled,
    },
    // Lenovo Yoga 9 14ITL5, initial lid notification never arrives
    QuirkEntry {
        matches: QuirkMatch {
            sys_vendor: Some("LENOVO"),
            product_name: Some("82BG"),
            bios_version: None,
        },
        policy: InitialStatePolicy::AssumeOpen,
    },
    // Medion Akoya E2215T, only close is notified and the raw state sticks
    // at closed
    QuirkEntry {
        matches: QuirkMatch {
            sys_vendor: Some("MEDION"),
            product_name: Some("E2215T"),
            bios_version: None,
        },
        policy: InitialStatePolicy::AssumeOpen,
    },
    // Medion Akoya E2228T, same firmware behavior as the E2215T
    QuirkEntry {
        matches: QuirkMatch {
            sys_vendor: Some("MEDION"),
            product_name: Some("E2228T"),
            bios_version: None,
        },
        policy: InitialStatePolicy::AssumeOpen,
    },
    // Razer Blade Stealth 13 late 2019, only close is notified
    QuirkEntry {
        matches: QuirkMatch {
            sys_vendor: Some("Razer"),
            product_name: Some("Razer Blade Stealth 13 Late 2019"),
            bios_version: None,
        },
        policy: InitialStatePolicy::AssumeOpen,
    },
];

/// Resolve the initial-state policy for a machine identity
///
/// First matching quirk wins; absence of a match is not an error, it is the
/// default `method` policy.
pub fn resolve(identity: &SystemIdentity) -> InitialStatePolicy {
    for entry in LID_QUIRKS {
        if entry.matches.matches(identity) {
            debug!(
                policy = entry.policy.as_str(),
                vendor = %identity.sys_vendor,
                product = %identity.product_name,
                "lid quirk matched"
            );
            return entry.policy;
        }
    }
    InitialStatePolicy::QueryMethod
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_defaults_to_method() {
        let id = SystemIdentity::from_parts("ExampleVendor", "ExampleBook", "1.0");
        assert_eq!(resolve(&id), InitialStatePolicy::QueryMethod);
    }

    #[test]
    fn test_all_fields_must_match() {
        // Right vendor and product, wrong firmware revision.
        let id = SystemIdentity::from_parts("Insyde", "T701", "SOMETHING.ELSE");
        assert_eq!(resolve(&id), InitialStatePolicy::QueryMethod);

        let id = SystemIdentity::from_parts("Insyde", "T701", "BYT70A.YNCHENG.WIN.007");
        assert_eq!(resolve(&id), InitialStatePolicy::Disabled);
    }

    #[test]
    fn test_wildcard_bios_field() {
        let id = SystemIdentity::from_parts("LENOVO", "82BG", "any firmware at all");
        assert_eq!(resolve(&id), InitialStatePolicy::AssumeOpen);
    }

    #[test]
    fn test_match_is_exact_not_substring() {
        let id = SystemIdentity::from_parts("MEDION", "E2215T-PRO", "1.0");
        assert_eq!(resolve(&id), InitialStatePolicy::QueryMethod);
    }

    #[test]
    fn test_first_match_wins() {
        let custom = [
            QuirkEntry {
                matches: QuirkMatch {
                    sys_vendor: Some("V"),
                    product_name: None,
                    bios_version: None,
                },
                policy: InitialStatePolicy::Ignore,
            },
            QuirkEntry {
                matches: QuirkMatch {
                    sys_vendor: Some("V"),
                    product_name: Some("P"),
                    bios_version: None,
                },
                policy: InitialStatePolicy::Disabled,
            },
        ];
        let id = SystemIdentity::from_parts("V", "P", "B");
        let hit = custom
            .iter()
            .find(|e| e.matches.matches(&id))
            .map(|e| e.policy);
        assert_eq!(hit, Some(InitialStatePolicy::Ignore));
    }
}
