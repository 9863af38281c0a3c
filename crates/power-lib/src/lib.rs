//! Core library for rack power accounting
//!
//! This crate provides the core functionality for:
//! - Power unit normalization (mW/W/kW)
//! - Node classification and per-type metric resolution
//! - Boundary-aware trapezoidal energy integration
//! - Multi-node aggregation with per-node failure capture
//! - Rack-level compute-vs-PDU validation

pub mod energy;
pub mod error;
pub mod models;
pub mod nodes;
pub mod racks;
pub mod service;
pub mod stats;
pub mod units;
pub mod validation;

pub use energy::{integrate, analyze_multi, analyze_node, SampleSource, StaticSource};
pub use error::PowerError;
pub use models::*;
pub use nodes::{classify, MetricResolution, NodeType};
pub use racks::RackCatalog;
pub use service::PowerService;
pub use stats::{PowerSummary, QualityReport};
pub use units::Unit;
pub use validation::validate;
