//! Rack-level power validation
//!
//! Cross-checks the summed compute-node energy of a rack against its PDU
//! measurements. Racks whose switches or other components are not behind a
//! measured PDU carry a fixed estimation offset that is subtracted from the
//! discrepancy before banding.

use crate::models::{RackProfile, ToleranceBand, ToleranceClass, ValidationResult, Window};
use std::collections::BTreeMap;

/// Discrepancy ratio at or below this is GOOD
const GOOD_RATIO: f64 = 0.10;

/// Discrepancy ratio at or below this is ACCEPTABLE
const ACCEPTABLE_RATIO: f64 = 0.20;

/// Validate a rack's compute energy against its PDU reference.
///
/// `compute_totals` / `pdu_totals` map node ids to per-node energy totals in
/// kWh; nodes missing from the maps (typically failed fetches) simply do not
/// contribute. A zero PDU total is classified NeedsInvestigation rather than
/// raised as an error: a batch report should flag the anomaly, not crash.
pub fn validate(
    profile: &RackProfile,
    compute_totals: &BTreeMap<String, f64>,
    pdu_totals: &BTreeMap<String, f64>,
    window: Window,
) -> ValidationResult {
    let compute_energy_kwh: f64 = profile
        .compute_nodes
        .iter()
        .filter_map(|n| compute_totals.get(n))
        .sum();
    let pdu_energy_kwh: f64 = profile
        .pdu_nodes
        .iter()
        .filter_map(|n| pdu_totals.get(n))
        .sum();

    let raw_difference_kwh = pdu_energy_kwh - compute_energy_kwh;
    let adjusted_difference_kwh = match profile.tolerance_class {
        ToleranceClass::Estimated => {
            raw_difference_kwh - profile.estimation_offset_kw * window.elapsed_hours()
        }
        ToleranceClass::Accurate => raw_difference_kwh,
    };

    let failed_nodes: Vec<String> = profile
        .compute_nodes
        .iter()
        .filter(|n| !compute_totals.contains_key(*n))
        .chain(profile.pdu_nodes.iter().filter(|n| !pdu_totals.contains_key(*n)))
        .cloned()
        .collect();

    let zero_reference = pdu_energy_kwh == 0.0;
    let (difference_ratio, band) = if zero_reference {
        (None, ToleranceBand::NeedsInvestigation)
    } else {
        let ratio = (adjusted_difference_kwh / pdu_energy_kwh).abs();
        let band = if ratio <= GOOD_RATIO {
            ToleranceBand::Good
        } else if ratio <= ACCEPTABLE_RATIO {
            ToleranceBand::Acceptable
        } else {
            ToleranceBand::NeedsInvestigation
        };
        (Some(ratio), band)
    };

    ValidationResult {
        rack_id: profile.rack_id.clone(),
        compute_energy_kwh,
        pdu_energy_kwh,
        raw_difference_kwh,
        adjusted_difference_kwh,
        difference_ratio,
        band,
        zero_reference,
        failed_nodes,
    }
}
