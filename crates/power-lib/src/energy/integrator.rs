//! Boundary-aware trapezoidal energy integration
//!
//! Turns an irregularly sampled power series into a cumulative-energy series
//! covering exactly the requested window. Query results rarely contain samples
//! at the exact window edges, so synthetic boundary rows carrying the nearest
//! real value are injected at the start (carry-backward) and end
//! (carry-forward) before integrating.

use crate::error::PowerError;
use crate::models::{EnergyRow, EnergySeries, NormalizedSample, Window};
use chrono::{DateTime, Utc};

/// Joules per kilowatt-hour
const JOULES_PER_KWH: f64 = 3_600_000.0;

/// Integrate one (node, metric) sample series over a window.
///
/// `fallback_power_w` seeds the boundary rows when the window contains no real
/// samples at all (e.g. the nearest reading outside the window); without it an
/// empty series is `InsufficientData`.
pub fn integrate(
    node_id: &str,
    metric_id: &str,
    samples: &[NormalizedSample],
    window: Window,
    fallback_power_w: Option<f64>,
) -> Result<EnergySeries, PowerError> {
    if window.start >= window.end {
        return Err(PowerError::InvalidWindow {
            start: window.start,
            end: window.end,
        });
    }

    // Ordered points within the window, first sample wins on duplicate
    // timestamps (the series invariant forbids them, dedup keeps us total).
    let mut points: Vec<(DateTime<Utc>, f64, bool)> = samples
        .iter()
        .filter(|s| s.timestamp >= window.start && s.timestamp <= window.end)
        .map(|s| (s.timestamp, s.power_w, false))
        .collect();
    points.sort_by_key(|(ts, _, _)| *ts);
    points.dedup_by_key(|(ts, _, _)| *ts);

    if points.is_empty() {
        let seed = fallback_power_w.ok_or_else(|| PowerError::InsufficientData {
            node_id: node_id.to_string(),
            metric_id: metric_id.to_string(),
        })?;
        points.push((window.start, seed, true));
        points.push((window.end, seed, true));
    } else {
        // Pad the edges with the nearest real neighbor's value. Already
        // aligned input is left untouched.
        if points[0].0 > window.start {
            points.insert(0, (window.start, points[0].1, true));
        }
        if points[points.len() - 1].0 < window.end {
            points.push((window.end, points[points.len() - 1].1, true));
        }
    }

    let mut rows = Vec::with_capacity(points.len());
    let mut cumulative = 0.0;
    for (i, &(timestamp, power_w, synthetic)) in points.iter().enumerate() {
        let (time_diff_seconds, avg_power_w, energy_interval_kwh) = if i == 0 {
            (0.0, power_w, 0.0)
        } else {
            let dt = (timestamp - points[i - 1].0).num_milliseconds() as f64 / 1000.0;
            // First real interval uses the current reading as its average
            // rather than a trapezoid with the previous row. Known quirk of
            // the accounting policy; it affects reported totals and is
            // pinned by tests, so keep it.
            let avg = if i == 1 {
                power_w
            } else {
                (power_w + points[i - 1].1) / 2.0
            };
            (dt, avg, avg * dt / JOULES_PER_KWH)
        };
        cumulative += energy_interval_kwh;
        rows.push(EnergyRow {
            timestamp,
            power_w,
            synthetic,
            time_diff_seconds,
            avg_power_w,
            energy_interval_kwh,
            cumulative_energy_kwh: cumulative,
        });
    }

    let total_energy_kwh = rows.last().map_or(0.0, |r| r.cumulative_energy_kwh);
    Ok(EnergySeries {
        node_id: node_id.to_string(),
        metric_id: metric_id.to_string(),
        rows,
        total_energy_kwh,
    })
}
