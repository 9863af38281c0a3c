//! Node classification and per-type metric resolution
//!
//! Hostname prefixes identify what a node is and therefore which metrics to
//! query for it. Compute nodes (`rpg-` for H100, `rpc-` for Zen4) expose a
//! variable set of power rails discovered from the node's schema; PDUs and
//! in-row coolers have fixed, well-known metric lists.

use crate::error::PowerError;
use serde::{Deserialize, Serialize};

/// Power metrics reported by in-row cooler (IRC) units
pub const IRC_POWER_METRICS: &[&str] = &[
    "CompressorPower",
    "CondenserFanPower",
    "CoolDemand",
    "CoolOutput",
    "TotalAirSideCoolingDemand",
    "TotalSensibleCoolingPower",
];

/// Power metrics reported by PDU units
pub const PDU_POWER_METRICS: &[&str] = &["pdu"];

/// Metrics that report headroom or derived values rather than consumption;
/// they never participate in energy totals
pub const EXCLUDED_METRICS: &[&str] = &["systemheadroominstantaneous", "computepower"];

/// Node category derived from the hostname prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// Compute node (rpg-* H100, rpc-* Zen4)
    Compute,
    /// Power distribution unit (pdu-*)
    Pdu,
    /// Infrastructure cooling unit (irc-*)
    Infra,
}

/// How the metric set for a node is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricResolution {
    /// Query all power metrics found in the node's schema
    Discover,
    /// Fixed, hardcoded metric list for the node type
    Fixed(&'static [&'static str]),
}

impl NodeType {
    /// Resolve the metric set policy for this node type
    pub fn metric_resolution(self) -> MetricResolution {
        match self {
            NodeType::Compute => MetricResolution::Discover,
            NodeType::Pdu => MetricResolution::Fixed(PDU_POWER_METRICS),
            NodeType::Infra => MetricResolution::Fixed(IRC_POWER_METRICS),
        }
    }
}

/// Classify a hostname into a node type by prefix
pub fn classify(hostname: &str) -> Result<NodeType, PowerError> {
    if hostname.starts_with("rpg-") || hostname.starts_with("rpc-") {
        Ok(NodeType::Compute)
    } else if hostname.starts_with("pdu-") {
        Ok(NodeType::Pdu)
    } else if hostname.starts_with("irc-") {
        Ok(NodeType::Infra)
    } else {
        Err(PowerError::UnknownNodeType {
            hostname: hostname.to_string(),
        })
    }
}

/// Whether a metric measures real power consumption (vs headroom or a
/// derived figure) and may be added into energy totals
pub fn is_consumption_metric(metric_id: &str) -> bool {
    let lower = metric_id.to_lowercase();
    !EXCLUDED_METRICS.contains(&lower.as_str())
}
