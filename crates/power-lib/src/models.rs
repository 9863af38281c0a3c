//! Core data models for power and energy accounting

use crate::error::PowerError;
use crate::units::Unit;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Raw power reading as produced by the external query layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub node_id: String,
    pub metric_id: String,
    pub raw_value: f64,
    pub unit: Unit,
}

impl Sample {
    /// Normalize the raw reading to Watts
    pub fn normalize(&self) -> NormalizedSample {
        NormalizedSample {
            timestamp: self.timestamp,
            node_id: self.node_id.clone(),
            metric_id: self.metric_id.clone(),
            raw_value: self.raw_value,
            unit: self.unit,
            power_w: self.unit.to_watts(self.raw_value),
        }
    }
}

/// Sample with its power value converted to Watts; never mutated after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedSample {
    pub timestamp: DateTime<Utc>,
    pub node_id: String,
    pub metric_id: String,
    pub raw_value: f64,
    pub unit: Unit,
    pub power_w: f64,
}

/// One row of the derived energy series.
///
/// Invariants: the first row's `cumulative_energy_kwh` is exactly 0.0 and the
/// running total never decreases. Synthetic rows are injected at window edges
/// when no real sample lands exactly there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyRow {
    pub timestamp: DateTime<Utc>,
    pub power_w: f64,
    /// True for boundary rows synthesized at the window edges
    pub synthetic: bool,
    /// Gap to the previous row in seconds (0 for the first row)
    pub time_diff_seconds: f64,
    /// Trapezoidal average with the previous row (see integrator for the
    /// first-interval exception)
    pub avg_power_w: f64,
    /// Energy accrued since the previous row
    pub energy_interval_kwh: f64,
    /// Running total since the window start
    pub cumulative_energy_kwh: f64,
}

/// Energy series for one (node, metric) pair over a window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergySeries {
    pub node_id: String,
    pub metric_id: String,
    pub rows: Vec<EnergyRow>,
    pub total_energy_kwh: f64,
}

/// Inclusive analysis window in UTC
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// Construct a window, rejecting start >= end
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, PowerError> {
        if start >= end {
            return Err(PowerError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Re-check the window invariant for windows built from literals
    pub fn validate(&self) -> Result<(), PowerError> {
        if self.start >= self.end {
            return Err(PowerError::InvalidWindow {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Window length in hours
    pub fn elapsed_hours(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 3600.0
    }
}

/// Per-node analysis output: one energy series per metric plus the summed total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeAnalysis {
    pub node_id: String,
    pub series: Vec<EnergySeries>,
    /// Sum of final cumulative values across the node's consumption metrics.
    /// Distinct power rails add; they are never averaged.
    pub total_energy_kwh: f64,
    pub summary: crate::stats::PowerSummary,
}

/// How trustworthy a rack's PDU coverage is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToleranceClass {
    /// All rack load is PDU-measured
    Accurate,
    /// Switches or other unmeasured components draw a known fixed load
    Estimated,
}

/// Classification of the compute-vs-PDU discrepancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToleranceBand {
    /// Within 10% of the PDU reference
    Good,
    /// Within 20% of the PDU reference
    Acceptable,
    /// Above 20%, or the PDU reference itself is zero
    NeedsInvestigation,
}

/// Static reference data for one rack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RackProfile {
    pub rack_id: String,
    pub compute_nodes: BTreeSet<String>,
    pub pdu_nodes: BTreeSet<String>,
    /// Expected draw of unmeasured components, subtracted for Estimated racks
    pub estimation_offset_kw: f64,
    pub tolerance_class: ToleranceClass,
}

/// Outcome of cross-checking a rack's compute energy against its PDUs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub rack_id: String,
    pub compute_energy_kwh: f64,
    pub pdu_energy_kwh: f64,
    pub raw_difference_kwh: f64,
    pub adjusted_difference_kwh: f64,
    /// |adjusted| / pdu; absent when the PDU reference is zero
    pub difference_ratio: Option<f64>,
    pub band: ToleranceBand,
    /// True when the PDU total was zero, itself an anomaly worth flagging
    pub zero_reference: bool,
    /// Nodes whose data could not be fetched; excluded from the sums
    pub failed_nodes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sample_normalization() {
        let sample = Sample {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
            node_id: "rpc-91-1".to_string(),
            metric_id: "systeminputpower".to_string(),
            raw_value: 150_000.0,
            unit: Unit::Milliwatts,
        };
        let normalized = sample.normalize();
        assert_eq!(normalized.power_w, 150.0);
        assert_eq!(normalized.raw_value, 150_000.0);
    }

    #[test]
    fn test_window_rejects_inverted_range() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 11, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        assert!(matches!(
            Window::new(start, end),
            Err(PowerError::InvalidWindow { .. })
        ));
        assert!(matches!(
            Window::new(start, start),
            Err(PowerError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_window_elapsed_hours() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 1, 11, 30, 0).unwrap();
        let window = Window::new(start, end).unwrap();
        assert!((window.elapsed_hours() - 1.5).abs() < f64::EPSILON);
    }
}
