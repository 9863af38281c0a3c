//! Power unit normalization
//!
//! The telemetry schemas report power in a mix of mW, W and kW depending on
//! the metric. Everything downstream of ingestion works in Watts, so samples
//! are normalized exactly once on entry.

use crate::error::PowerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Metrics known to be reported in milliwatts by the iDRAC schema
pub const MW_METRICS: &[&str] = &[
    "drampwr",
    "pkgpwr",
    "gpuinputpower",
    "gpuoutputpower",
    "gpuarbitratedpowerlimit",
    "gpuenforcedpowerlimit",
    "gpuswitchpower",
    "rxinputpower",
    "txoutputpower",
    "systeminputpower",
    "systemoutputpower",
];

/// Metrics known to be reported in plain Watts
pub const W_METRICS: &[&str] = &[
    "computepower",
    "cpupower",
    "systempower",
    "systempowerconsumption",
    "totalcpupower",
    "totalfanpower",
    "totalmemorypower",
    "totalpciepower",
    "totalstoragepower",
    "totalfpgapower",
    "totalgpupower",
];

/// Heuristic cutoff for unlabeled metrics: per-rail readings above this are
/// assumed to be milliwatts
const MW_HEURISTIC_CUTOFF: f64 = 4000.0;

/// Power unit as reported by the metrics_definition table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "mW", alias = "mw")]
    Milliwatts,
    #[serde(rename = "W", alias = "w")]
    Watts,
    #[serde(rename = "kW", alias = "kw")]
    Kilowatts,
}

impl Unit {
    /// Convert a raw reading in this unit to Watts
    pub fn to_watts(self, raw_value: f64) -> f64 {
        match self {
            Unit::Milliwatts => raw_value / 1000.0,
            Unit::Watts => raw_value,
            Unit::Kilowatts => raw_value * 1000.0,
        }
    }

    /// Convert a value in Watts back to this unit (exact inverse of `to_watts`)
    pub fn from_watts(self, power_w: f64) -> f64 {
        match self {
            Unit::Milliwatts => power_w * 1000.0,
            Unit::Watts => power_w,
            Unit::Kilowatts => power_w / 1000.0,
        }
    }
}

impl FromStr for Unit {
    type Err = PowerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mw" => Ok(Unit::Milliwatts),
            "w" => Ok(Unit::Watts),
            "kw" => Ok(Unit::Kilowatts),
            other => Err(PowerError::UnsupportedUnit {
                unit: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Milliwatts => write!(f, "mW"),
            Unit::Watts => write!(f, "W"),
            Unit::Kilowatts => write!(f, "kW"),
        }
    }
}

/// Look up the known unit for a metric name, if the schema documents one
pub fn unit_for_metric(metric_id: &str) -> Option<Unit> {
    let lower = metric_id.to_lowercase();
    if MW_METRICS.contains(&lower.as_str()) {
        Some(Unit::Milliwatts)
    } else if W_METRICS.contains(&lower.as_str()) {
        Some(Unit::Watts)
    } else {
        None
    }
}

/// Infer a unit for a sample whose metric is not in the known tables.
///
/// Falls back on the magnitude heuristic used by the upstream schema queries:
/// a per-rail reading above 4000 is almost certainly milliwatts.
pub fn infer_unit(metric_id: &str, raw_value: f64) -> Unit {
    match unit_for_metric(metric_id) {
        Some(unit) => unit,
        None if raw_value > MW_HEURISTIC_CUTOFF => Unit::Milliwatts,
        None => Unit::Watts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_milliwatts_to_watts() {
        assert_eq!(Unit::Milliwatts.to_watts(150_000.0), 150.0);
    }

    #[test]
    fn test_kilowatts_to_watts() {
        assert_eq!(Unit::Kilowatts.to_watts(1.5), 1500.0);
    }

    #[test]
    fn test_watts_identity() {
        assert_eq!(Unit::Watts.to_watts(152.5), 152.5);
    }

    #[test]
    fn test_round_trip_exact() {
        for unit in [Unit::Milliwatts, Unit::Watts, Unit::Kilowatts] {
            let raw = 123.25;
            assert_eq!(unit.from_watts(unit.to_watts(raw)), raw);
        }
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("mW".parse::<Unit>().unwrap(), Unit::Milliwatts);
        assert_eq!("KW".parse::<Unit>().unwrap(), Unit::Kilowatts);
        assert_eq!("w".parse::<Unit>().unwrap(), Unit::Watts);
    }

    #[test]
    fn test_parse_unsupported() {
        let err = "BTU".parse::<Unit>().unwrap_err();
        assert!(matches!(err, PowerError::UnsupportedUnit { .. }));
    }

    #[test]
    fn test_unit_for_known_metrics() {
        assert_eq!(unit_for_metric("SystemInputPower"), Some(Unit::Milliwatts));
        assert_eq!(unit_for_metric("cpupower"), Some(Unit::Watts));
        assert_eq!(unit_for_metric("CompressorPower"), None);
    }

    #[test]
    fn test_infer_unit_heuristic() {
        // Unknown metric, large magnitude: treated as mW
        assert_eq!(infer_unit("somepower", 250_000.0), Unit::Milliwatts);
        // Unknown metric, plausible Watts range
        assert_eq!(infer_unit("somepower", 300.0), Unit::Watts);
    }
}
