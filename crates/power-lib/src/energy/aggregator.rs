//! Multi-node aggregation over a sample-fetch collaborator
//!
//! Fetching is the only blocking operation in an analysis run, so it sits
//! behind the async `SampleSource` trait. A failure fetching one node is
//! captured in that node's map entry and never aborts its siblings.

use crate::error::PowerError;
use crate::models::{NodeAnalysis, Sample, Window};
use crate::nodes::{self, MetricResolution};
use crate::stats::{PowerSummary, QualityReport};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::integrate;

/// Trait for sample-fetch implementations (database clients, file exports,
/// canned test data)
#[async_trait]
pub trait SampleSource: Send + Sync {
    /// Fetch raw samples for one node/metric over a window
    async fn fetch(&self, node_id: &str, metric_id: &str, window: Window) -> Result<Vec<Sample>>;

    /// List the power metrics present in a node's schema (used for compute
    /// nodes, whose rail set varies by hardware generation)
    async fn power_metrics(&self, node_id: &str) -> Result<Vec<String>>;
}

/// Analyze one node: resolve its metric set, integrate each metric's series
/// and sum the final cumulative values across consumption metrics.
///
/// Metrics with no samples in the window are skipped; the node only fails
/// when fetching breaks or no metric yields any data at all.
pub async fn analyze_node(
    source: &dyn SampleSource,
    node_id: &str,
    window: Window,
) -> Result<NodeAnalysis, PowerError> {
    let node_type = nodes::classify(node_id)?;

    let metrics: Vec<String> = match node_type.metric_resolution() {
        MetricResolution::Fixed(list) => list.iter().map(|m| m.to_string()).collect(),
        MetricResolution::Discover => {
            source
                .power_metrics(node_id)
                .await
                .map_err(|e| PowerError::FetchFailure {
                    node_id: node_id.to_string(),
                    metric_id: "metrics_definition".to_string(),
                    source: e,
                })?
        }
    };

    let mut series = Vec::new();
    for metric_id in &metrics {
        let samples = source
            .fetch(node_id, metric_id, window)
            .await
            .map_err(|e| PowerError::FetchFailure {
                node_id: node_id.to_string(),
                metric_id: metric_id.clone(),
                source: e,
            })?;

        let normalized: Vec<_> = samples.iter().map(Sample::normalize).collect();
        let quality = QualityReport::inspect(&normalized);
        if !quality.is_clean() {
            tracing::warn!(
                node_id,
                metric_id = %metric_id,
                negative = quality.negative_values,
                implausible = quality.implausible_values,
                out_of_order = quality.out_of_order,
                "suspect readings in sample batch"
            );
        }
        match integrate(node_id, metric_id, &normalized, window, None) {
            Ok(s) => series.push(s),
            Err(PowerError::InsufficientData { .. }) => {
                tracing::debug!(node_id, metric_id = %metric_id, "no samples in window, skipping metric");
            }
            Err(e) => return Err(e),
        }
    }

    if series.is_empty() {
        return Err(PowerError::InsufficientData {
            node_id: node_id.to_string(),
            metric_id: metrics.join(","),
        });
    }

    // Distinct rails (CPU, memory, system, ...) add into the node total;
    // headroom and derived metrics stay out of the sum.
    let total_energy_kwh = series
        .iter()
        .filter(|s| nodes::is_consumption_metric(&s.metric_id))
        .map(|s| s.total_energy_kwh)
        .sum();

    let summaries: Vec<PowerSummary> = series
        .iter()
        .map(|s| PowerSummary::from_rows(&s.rows))
        .collect();

    Ok(NodeAnalysis {
        node_id: node_id.to_string(),
        series,
        total_energy_kwh,
        summary: PowerSummary::merge(&summaries),
    })
}

/// Analyze a set of nodes with per-node failure capture. The returned map has
/// an entry for every requested node; failed nodes carry their error kind
/// instead of aborting the batch.
pub async fn analyze_multi(
    source: &dyn SampleSource,
    node_ids: &[String],
    window: Window,
) -> BTreeMap<String, Result<NodeAnalysis, PowerError>> {
    let mut results = BTreeMap::new();
    for node_id in node_ids {
        let outcome = analyze_node(source, node_id, window).await;
        if let Err(err) = &outcome {
            tracing::warn!(node_id = %node_id, error = %err, "node analysis failed");
        }
        results.insert(node_id.clone(), outcome);
    }
    results
}

/// In-memory source backed by canned samples, for tests and offline replay
#[derive(Debug, Default)]
pub struct StaticSource {
    samples: HashMap<String, Vec<Sample>>,
    unreachable: HashSet<String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add samples for a node (appended to any existing ones)
    pub fn with_samples(mut self, node_id: &str, samples: Vec<Sample>) -> Self {
        self.samples
            .entry(node_id.to_string())
            .or_default()
            .extend(samples);
        self
    }

    /// Mark a node as unreachable; fetches for it fail like a dropped tunnel
    pub fn with_unreachable(mut self, node_id: &str) -> Self {
        self.unreachable.insert(node_id.to_string());
        self
    }
}

#[async_trait]
impl SampleSource for StaticSource {
    async fn fetch(&self, node_id: &str, metric_id: &str, window: Window) -> Result<Vec<Sample>> {
        if self.unreachable.contains(node_id) {
            anyhow::bail!("connection refused: {node_id}");
        }
        Ok(self
            .samples
            .get(node_id)
            .map(|all| {
                all.iter()
                    .filter(|s| {
                        s.metric_id == metric_id
                            && s.timestamp >= window.start
                            && s.timestamp <= window.end
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn power_metrics(&self, node_id: &str) -> Result<Vec<String>> {
        if self.unreachable.contains(node_id) {
            anyhow::bail!("connection refused: {node_id}");
        }
        let mut metrics: Vec<String> = self
            .samples
            .get(node_id)
            .map(|all| all.iter().map(|s| s.metric_id.clone()).collect::<HashSet<_>>())
            .unwrap_or_default()
            .into_iter()
            .collect();
        metrics.sort();
        Ok(metrics)
    }
}
