//! Scenario tests for the energy module: aggregation across node types and
//! the per-node partial-failure policy.

use super::*;
use crate::error::PowerError;
use crate::models::{Sample, Window};
use crate::units::Unit;
use chrono::{TimeZone, Utc};

fn window_1h() -> Window {
    Window::new(
        Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 1, 1, 11, 0, 0).unwrap(),
    )
    .unwrap()
}

fn flat_samples(node_id: &str, metric_id: &str, power_w: f64, unit: Unit) -> Vec<Sample> {
    (0..=60)
        .map(|i| Sample {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap()
                + chrono::Duration::minutes(i),
            node_id: node_id.to_string(),
            metric_id: metric_id.to_string(),
            raw_value: unit.from_watts(power_w),
            unit,
        })
        .collect()
}

#[tokio::test]
async fn test_analyze_compute_node_sums_rails() {
    // CPU + memory rails add, they are never averaged
    let source = StaticSource::new()
        .with_samples("rpc-91-1", flat_samples("rpc-91-1", "cpupower", 100.0, Unit::Watts))
        .with_samples(
            "rpc-91-1",
            flat_samples("rpc-91-1", "totalmemorypower", 50.0, Unit::Watts),
        );

    let analysis = analyze_node(&source, "rpc-91-1", window_1h()).await.unwrap();
    assert_eq!(analysis.series.len(), 2);
    assert!((analysis.total_energy_kwh - 0.15).abs() < 0.001);
}

#[tokio::test]
async fn test_analyze_node_excludes_headroom_from_total() {
    let source = StaticSource::new()
        .with_samples("rpc-91-1", flat_samples("rpc-91-1", "cpupower", 100.0, Unit::Watts))
        .with_samples(
            "rpc-91-1",
            flat_samples("rpc-91-1", "systemheadroominstantaneous", 500.0, Unit::Watts),
        );

    let analysis = analyze_node(&source, "rpc-91-1", window_1h()).await.unwrap();
    // Both series are present, only the consumption rail counts
    assert_eq!(analysis.series.len(), 2);
    assert!((analysis.total_energy_kwh - 0.1).abs() < 0.001);
}

#[tokio::test]
async fn test_analyze_pdu_uses_fixed_metric_list() {
    // A PDU's schema is never discovered; the fixed "pdu" metric is queried
    let source = StaticSource::new().with_samples(
        "pdu-91-1",
        flat_samples("pdu-91-1", "pdu", 2000.0, Unit::Kilowatts),
    );

    let analysis = analyze_node(&source, "pdu-91-1", window_1h()).await.unwrap();
    assert_eq!(analysis.series.len(), 1);
    assert_eq!(analysis.series[0].metric_id, "pdu");
    assert!((analysis.total_energy_kwh - 2.0).abs() < 0.01);
}

#[tokio::test]
async fn test_analyze_node_milliwatt_normalization() {
    let source = StaticSource::new().with_samples(
        "rpg-93-1",
        flat_samples("rpg-93-1", "systeminputpower", 150.0, Unit::Milliwatts),
    );

    let analysis = analyze_node(&source, "rpg-93-1", window_1h()).await.unwrap();
    assert!((analysis.total_energy_kwh - 0.15).abs() < 0.001);
    assert!((analysis.summary.mean_power_w - 150.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_analyze_node_unknown_hostname() {
    let source = StaticSource::new();
    let err = analyze_node(&source, "login-1", window_1h()).await.unwrap_err();
    assert!(matches!(err, PowerError::UnknownNodeType { .. }));
}

#[tokio::test]
async fn test_analyze_node_no_data() {
    let source = StaticSource::new();
    let err = analyze_node(&source, "pdu-91-1", window_1h()).await.unwrap_err();
    assert!(matches!(err, PowerError::InsufficientData { .. }));
}

#[tokio::test]
async fn test_multi_node_partial_failure() {
    // Node 2's fetch fails; nodes 1 and 3 still produce totals
    let source = StaticSource::new()
        .with_samples("rpc-91-1", flat_samples("rpc-91-1", "cpupower", 100.0, Unit::Watts))
        .with_unreachable("rpc-91-2")
        .with_samples("rpc-91-3", flat_samples("rpc-91-3", "cpupower", 300.0, Unit::Watts));

    let nodes: Vec<String> = ["rpc-91-1", "rpc-91-2", "rpc-91-3"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let results = analyze_multi(&source, &nodes, window_1h()).await;

    assert_eq!(results.len(), 3);
    assert!((results["rpc-91-1"].as_ref().unwrap().total_energy_kwh - 0.1).abs() < 0.001);
    assert!((results["rpc-91-3"].as_ref().unwrap().total_energy_kwh - 0.3).abs() < 0.001);
    assert!(matches!(
        results["rpc-91-2"].as_ref().unwrap_err(),
        PowerError::FetchFailure { .. }
    ));
}

#[tokio::test]
async fn test_multi_node_empty_set() {
    let source = StaticSource::new();
    let results = analyze_multi(&source, &[], window_1h()).await;
    assert!(results.is_empty());
}
