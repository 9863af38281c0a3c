//! High-level analysis façade
//!
//! Bundles a sample source with the rack catalog and exposes the three
//! caller-facing operations: single-node analysis, multi-node analysis and
//! rack validation. Callers (CLI, report generators, tests) never touch the
//! fetch layer directly.

use crate::energy::{self, SampleSource};
use crate::error::PowerError;
use crate::models::{NodeAnalysis, Sample, ValidationResult, Window};
use crate::racks::RackCatalog;
use crate::validation;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Compute-side rail used for rack validation. PDUs measure wall draw, so the
/// comparison uses the system input rail; summing every per-component rail
/// would double count.
const RACK_COMPUTE_METRIC: &str = "systeminputpower";

/// PDU-side metric used for rack validation
const RACK_PDU_METRIC: &str = "pdu";

/// Analysis service over a sample source and rack catalog
pub struct PowerService {
    source: Arc<dyn SampleSource>,
    racks: RackCatalog,
}

impl PowerService {
    pub fn new(source: Arc<dyn SampleSource>, racks: RackCatalog) -> Self {
        Self { source, racks }
    }

    pub fn racks(&self) -> &RackCatalog {
        &self.racks
    }

    /// Analyze one node over a window
    pub async fn analyze_node(
        &self,
        node_id: &str,
        window: Window,
    ) -> Result<NodeAnalysis, PowerError> {
        energy::analyze_node(self.source.as_ref(), node_id, window).await
    }

    /// Analyze a node set with per-node failure capture
    pub async fn analyze_multi(
        &self,
        node_ids: &[String],
        window: Window,
    ) -> BTreeMap<String, Result<NodeAnalysis, PowerError>> {
        energy::analyze_multi(self.source.as_ref(), node_ids, window).await
    }

    /// Validate a rack's compute energy against its PDU measurements.
    ///
    /// Nodes whose fetch fails are excluded from the sums, logged and listed
    /// in the result; the validation itself always completes.
    pub async fn analyze_rack(
        &self,
        rack_id: &str,
        window: Window,
    ) -> Result<ValidationResult, PowerError> {
        window.validate()?;
        let profile = self.racks.get(rack_id)?.clone();

        let mut compute_totals = BTreeMap::new();
        for node_id in &profile.compute_nodes {
            match self.metric_total(node_id, RACK_COMPUTE_METRIC, window).await {
                Ok(total) => {
                    compute_totals.insert(node_id.clone(), total);
                }
                Err(err) => {
                    tracing::warn!(node_id = %node_id, error = %err, "compute node excluded from rack validation");
                }
            }
        }

        let mut pdu_totals = BTreeMap::new();
        for node_id in &profile.pdu_nodes {
            match self.metric_total(node_id, RACK_PDU_METRIC, window).await {
                Ok(total) => {
                    pdu_totals.insert(node_id.clone(), total);
                }
                Err(err) => {
                    tracing::warn!(node_id = %node_id, error = %err, "PDU node excluded from rack validation");
                }
            }
        }

        let result = validation::validate(&profile, &compute_totals, &pdu_totals, window);
        tracing::info!(
            rack_id = %result.rack_id,
            compute_kwh = result.compute_energy_kwh,
            pdu_kwh = result.pdu_energy_kwh,
            band = ?result.band,
            "rack validation complete"
        );
        Ok(result)
    }

    /// Total energy for a single (node, metric) over a window
    async fn metric_total(
        &self,
        node_id: &str,
        metric_id: &str,
        window: Window,
    ) -> Result<f64, PowerError> {
        let samples = self
            .source
            .fetch(node_id, metric_id, window)
            .await
            .map_err(|e| PowerError::FetchFailure {
                node_id: node_id.to_string(),
                metric_id: metric_id.to_string(),
                source: e,
            })?;
        let normalized: Vec<_> = samples.iter().map(Sample::normalize).collect();
        let series = energy::integrate(node_id, metric_id, &normalized, window, None)?;
        Ok(series.total_energy_kwh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::StaticSource;
    use crate::models::ToleranceBand;
    use crate::units::Unit;
    use chrono::{TimeZone, Utc};

    fn window_1h() -> Window {
        Window::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 11, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn flat(node_id: &str, metric_id: &str, power_w: f64, unit: Unit) -> Vec<Sample> {
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

    /// A small two-compute, two-PDU rack for service tests
    fn test_catalog() -> RackCatalog {
        RackCatalog::from_profiles(vec![crate::models::RackProfile {
            rack_id: "rack-91".to_string(),
            compute_nodes: ["rpc-91-1", "rpc-91-2"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            pdu_nodes: ["pdu-91-1", "pdu-91-2"].iter().map(|s| s.to_string()).collect(),
            estimation_offset_kw: 0.0,
            tolerance_class: crate::models::ToleranceClass::Accurate,
        }])
    }

    #[tokio::test]
    async fn test_analyze_rack_good() {
        // Two 5 kW compute nodes vs two PDUs totalling 10.5 kW: GOOD
        let source = StaticSource::new()
            .with_samples("rpc-91-1", flat("rpc-91-1", "systeminputpower", 5000.0, Unit::Watts))
            .with_samples("rpc-91-2", flat("rpc-91-2", "systeminputpower", 5000.0, Unit::Watts))
            .with_samples("pdu-91-1", flat("pdu-91-1", "pdu", 5250.0, Unit::Watts))
            .with_samples("pdu-91-2", flat("pdu-91-2", "pdu", 5250.0, Unit::Watts));

        let service = PowerService::new(Arc::new(source), test_catalog());
        let result = service.analyze_rack("rack-91", window_1h()).await.unwrap();

        assert!((result.compute_energy_kwh - 10.0).abs() < 0.01);
        assert!((result.pdu_energy_kwh - 10.5).abs() < 0.01);
        assert_eq!(result.band, ToleranceBand::Good);
        assert!(result.failed_nodes.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_rack_with_unreachable_node() {
        let source = StaticSource::new()
            .with_samples("rpc-91-1", flat("rpc-91-1", "systeminputpower", 5000.0, Unit::Watts))
            .with_unreachable("rpc-91-2")
            .with_samples("pdu-91-1", flat("pdu-91-1", "pdu", 2625.0, Unit::Watts))
            .with_samples("pdu-91-2", flat("pdu-91-2", "pdu", 2625.0, Unit::Watts));

        let service = PowerService::new(Arc::new(source), test_catalog());
        let result = service.analyze_rack("rack-91", window_1h()).await.unwrap();

        // Unreachable node is reported, its energy simply missing from the sum
        assert_eq!(result.failed_nodes, vec!["rpc-91-2".to_string()]);
        assert!((result.compute_energy_kwh - 5.0).abs() < 0.01);
        assert_eq!(result.band, ToleranceBand::Good);
    }

    #[tokio::test]
    async fn test_analyze_rack_zero_pdu() {
        let source = StaticSource::new()
            .with_samples("rpc-91-1", flat("rpc-91-1", "systeminputpower", 5000.0, Unit::Watts))
            .with_samples("rpc-91-2", flat("rpc-91-2", "systeminputpower", 5000.0, Unit::Watts))
            .with_samples("pdu-91-1", flat("pdu-91-1", "pdu", 0.0, Unit::Watts))
            .with_samples("pdu-91-2", flat("pdu-91-2", "pdu", 0.0, Unit::Watts));

        let service = PowerService::new(Arc::new(source), test_catalog());
        let result = service.analyze_rack("rack-91", window_1h()).await.unwrap();

        assert!(result.zero_reference);
        assert_eq!(result.band, ToleranceBand::NeedsInvestigation);
    }

    #[tokio::test]
    async fn test_analyze_rack_unknown_rack() {
        let service = PowerService::new(Arc::new(StaticSource::new()), test_catalog());
        assert!(service.analyze_rack("rack-42", window_1h()).await.is_err());
    }
}
