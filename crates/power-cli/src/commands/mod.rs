//! CLI command implementations

pub mod multi;
pub mod node;
pub mod rack;
