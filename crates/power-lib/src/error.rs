//! Error taxonomy for the power accounting core
//!
//! Scope rules: `InvalidWindow` aborts the whole call (malformed caller input),
//! unit and classification errors abort only the sample or node being
//! processed, and `FetchFailure` is captured per node during aggregation so
//! sibling nodes are never affected.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors produced by the power accounting core
#[derive(Debug, Error)]
pub enum PowerError {
    /// Power unit string outside the supported mW/W/kW set
    #[error("unsupported power unit: {unit}")]
    UnsupportedUnit { unit: String },

    /// Hostname prefix does not map to a known node type
    #[error("unknown node type for hostname: {hostname}")]
    UnknownNodeType { hostname: String },

    /// Rack id not present in the catalog
    #[error("unknown rack: {rack_id}")]
    UnknownRack { rack_id: String },

    /// No samples and no fallback value available for a node/metric window
    #[error("insufficient data for {node_id}/{metric_id}")]
    InsufficientData { node_id: String, metric_id: String },

    /// Query window with start at or after end
    #[error("invalid window: start {start} is not before end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Underlying connectivity failure from the sample-fetch collaborator
    #[error("fetch failed for {node_id}/{metric_id}")]
    FetchFailure {
        node_id: String,
        metric_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// PDU reference total of zero; the validator degrades to
    /// NeedsInvestigation instead, this variant is for callers that
    /// want a hard failure
    #[error("zero PDU reference reading for rack {rack_id}")]
    ZeroReferenceReading { rack_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PowerError::InsufficientData {
            node_id: "rpc-91-1".to_string(),
            metric_id: "systeminputpower".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for rpc-91-1/systeminputpower"
        );
    }

    #[test]
    fn test_fetch_failure_preserves_source() {
        let err = PowerError::FetchFailure {
            node_id: "rpc-91-1".to_string(),
            metric_id: "pdu".to_string(),
            source: anyhow::anyhow!("connection refused"),
        };
        let source = std::error::Error::source(&err);
        assert!(source.is_some());
    }
}
