//! Static rack reference data
//!
//! Cluster racks 91-97 with their compute and PDU node membership. The counts
//! vary per rack (rack 93 and 95 only have two measured PDU strips; racks 92
//! and 93 hold four nodes). Profiles default to the Accurate tolerance class
//! with no estimation offset; deployments with unmeasured switch load
//! override the profile fields through configuration.

use crate::error::PowerError;
use crate::models::{RackProfile, ToleranceClass};
use std::collections::BTreeMap;

/// (rack number, compute node count, PDU strip count)
const RACK_LAYOUT: &[(u32, u32, u32)] = &[
    (91, 20, 4),
    (92, 4, 4),
    (93, 4, 2),
    (94, 20, 4),
    (95, 20, 2),
    (96, 20, 4),
    (97, 20, 4),
];

/// Catalog of rack profiles keyed by rack id
#[derive(Debug, Clone)]
pub struct RackCatalog {
    profiles: BTreeMap<String, RackProfile>,
}

impl RackCatalog {
    /// The builtin cluster layout
    pub fn builtin() -> Self {
        let profiles = RACK_LAYOUT
            .iter()
            .map(|&(rack, compute, pdus)| {
                let profile = RackProfile {
                    rack_id: format!("rack-{rack}"),
                    compute_nodes: (1..=compute).map(|i| format!("rpc-{rack}-{i}")).collect(),
                    pdu_nodes: (1..=pdus).map(|i| format!("pdu-{rack}-{i}")).collect(),
                    estimation_offset_kw: 0.0,
                    tolerance_class: ToleranceClass::Accurate,
                };
                (profile.rack_id.clone(), profile)
            })
            .collect();
        Self { profiles }
    }

    /// Build a catalog from explicit profiles (configuration overrides)
    pub fn from_profiles(profiles: Vec<RackProfile>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|p| (p.rack_id.clone(), p))
                .collect(),
        }
    }

    /// Look up a rack by id. Accepts both `rack-97` and a bare `97`.
    pub fn get(&self, rack_id: &str) -> Result<&RackProfile, PowerError> {
        let key = if rack_id.starts_with("rack-") {
            rack_id.to_string()
        } else {
            format!("rack-{rack_id}")
        };
        self.profiles
            .get(&key)
            .ok_or_else(|| PowerError::UnknownRack {
                rack_id: rack_id.to_string(),
            })
    }

    /// Replace or insert a profile (per-rack configuration overrides)
    pub fn upsert(&mut self, profile: RackProfile) {
        self.profiles.insert(profile.rack_id.clone(), profile);
    }

    pub fn iter(&self) -> impl Iterator<Item = &RackProfile> {
        self.profiles.values()
    }
}
