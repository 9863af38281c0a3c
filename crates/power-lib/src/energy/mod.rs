//! Energy derivation: per-series integration and multi-node aggregation
//!
//! The integrator is a pure function over already-fetched samples. The
//! aggregator drives it across a node set through the `SampleSource` trait,
//! which is the only async boundary in the crate.

mod aggregator;
mod integrator;

#[cfg(test)]
mod tests;

pub use aggregator::{analyze_multi, analyze_node, SampleSource, StaticSource};
pub use integrator::integrate;
