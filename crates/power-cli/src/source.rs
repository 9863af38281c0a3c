//! File-backed sample source
//!
//! The live system pulls telemetry from remote time-series databases over an
//! SSH tunnel; offline analysis works from the raw-data exports those tools
//! produce. Each node's samples live in `<data_dir>/<node_id>.json` as an
//! array of `{timestamp, metric, value, units}` records. Records without a
//! units field fall back on the per-metric unit tables and the magnitude
//! heuristic.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use power_lib::{units, Sample, SampleSource, Window};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// One exported sample record
#[derive(Debug, Deserialize)]
struct RawRecord {
    timestamp: DateTime<Utc>,
    metric: String,
    value: f64,
    #[serde(default)]
    units: Option<String>,
}

/// `SampleSource` over a directory of per-node JSON exports
pub struct JsonDirSource {
    data_dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn node_path(&self, node_id: &str) -> PathBuf {
        self.data_dir.join(format!("{node_id}.json"))
    }

    fn load_records(path: &Path, node_id: &str) -> Result<Vec<RawRecord>> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("no sample export for node {node_id} at {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("malformed sample export {}", path.display()))
    }

    fn to_sample(record: RawRecord, node_id: &str) -> Result<Sample> {
        let unit = match &record.units {
            Some(s) => s.parse()?,
            None => units::infer_unit(&record.metric, record.value),
        };
        Ok(Sample {
            timestamp: record.timestamp,
            node_id: node_id.to_string(),
            metric_id: record.metric,
            raw_value: record.value,
            unit,
        })
    }
}

#[async_trait]
impl SampleSource for JsonDirSource {
    async fn fetch(&self, node_id: &str, metric_id: &str, window: Window) -> Result<Vec<Sample>> {
        let records = Self::load_records(&self.node_path(node_id), node_id)?;
        records
            .into_iter()
            .filter(|r| {
                r.metric == metric_id && r.timestamp >= window.start && r.timestamp <= window.end
            })
            .map(|r| Self::to_sample(r, node_id))
            .collect()
    }

    async fn power_metrics(&self, node_id: &str) -> Result<Vec<String>> {
        let records = Self::load_records(&self.node_path(node_id), node_id)?;
        let metrics: BTreeSet<String> = records.into_iter().map(|r| r.metric).collect();
        Ok(metrics.into_iter().collect())
    }
}
