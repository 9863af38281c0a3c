//! Power summaries and data-quality checks over derived energy series

use crate::models::{EnergyRow, NormalizedSample};
use serde::{Deserialize, Serialize};

/// Per-node power value above which a reading is treated as a data error
const MAX_PLAUSIBLE_NODE_POWER_W: f64 = 10_000.0;

/// Summary statistics for one node over a window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerSummary {
    pub records: usize,
    pub mean_power_w: f64,
    pub min_power_w: f64,
    pub max_power_w: f64,
    pub duration_hours: f64,
    pub total_energy_kwh: f64,
}

impl PowerSummary {
    /// Build a summary from an energy series. Synthetic boundary rows carry
    /// neighbor values, so they are excluded from the power extrema but the
    /// duration and total span the full padded window.
    pub fn from_rows(rows: &[EnergyRow]) -> Self {
        let real: Vec<&EnergyRow> = rows.iter().filter(|r| !r.synthetic).collect();
        let (min, max, sum) = real.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), r| (min.min(r.power_w), max.max(r.power_w), sum + r.power_w),
        );

        let duration_hours = match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => {
                (last.timestamp - first.timestamp).num_seconds() as f64 / 3600.0
            }
            _ => 0.0,
        };

        Self {
            records: real.len(),
            mean_power_w: if real.is_empty() {
                0.0
            } else {
                sum / real.len() as f64
            },
            min_power_w: if real.is_empty() { 0.0 } else { min },
            max_power_w: if real.is_empty() { 0.0 } else { max },
            duration_hours,
            total_energy_kwh: rows.last().map_or(0.0, |r| r.cumulative_energy_kwh),
        }
    }

    /// Merge series summaries for a node with multiple power rails
    pub fn merge(summaries: &[PowerSummary]) -> Self {
        let mut out = Self::default();
        for s in summaries {
            out.records += s.records;
            out.total_energy_kwh += s.total_energy_kwh;
            out.duration_hours = out.duration_hours.max(s.duration_hours);
            out.max_power_w = out.max_power_w.max(s.max_power_w);
        }
        let with_data: Vec<&PowerSummary> = summaries.iter().filter(|s| s.records > 0).collect();
        if !with_data.is_empty() {
            out.mean_power_w = with_data.iter().map(|s| s.mean_power_w).sum::<f64>();
            out.min_power_w = with_data
                .iter()
                .map(|s| s.min_power_w)
                .fold(f64::INFINITY, f64::min);
        }
        out
    }
}

/// Quality findings for a raw sample batch. Findings are warnings, never
/// failures: a suspect batch still integrates, the caller decides what to do.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityReport {
    pub total_records: usize,
    pub negative_values: usize,
    pub implausible_values: usize,
    pub out_of_order: usize,
}

impl QualityReport {
    /// Inspect a normalized sample batch for suspect readings
    pub fn inspect(samples: &[NormalizedSample]) -> Self {
        let mut report = Self {
            total_records: samples.len(),
            ..Self::default()
        };
        for pair in samples.windows(2) {
            if pair[1].timestamp < pair[0].timestamp {
                report.out_of_order += 1;
            }
        }
        for sample in samples {
            if sample.power_w < 0.0 {
                report.negative_values += 1;
            } else if sample.power_w > MAX_PLAUSIBLE_NODE_POWER_W {
                report.implausible_values += 1;
            }
        }
        report
    }

    pub fn is_clean(&self) -> bool {
        self.negative_values == 0 && self.implausible_values == 0 && self.out_of_order == 0
    }
}
