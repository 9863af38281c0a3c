//! CLI configuration

use anyhow::{Context, Result};
use power_lib::{RackCatalog, RackProfile};
use serde::Deserialize;

/// CLI configuration, from the RACKPOWER_* environment
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Directory holding per-node JSON sample exports
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Window length used when --start/--end are not given
    #[serde(default = "default_window_hours")]
    pub default_window_hours: i64,

    /// Optional JSON file with rack profile overrides
    #[serde(default)]
    pub racks_file: Option<String>,
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_window_hours() -> i64 {
    24
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_window_hours: default_window_hours(),
            racks_file: None,
        }
    }
}

impl CliConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("RACKPOWER"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }

    /// Rack catalog: the builtin cluster layout, with any profiles from
    /// `racks_file` overriding per-rack fields
    pub fn rack_catalog(&self) -> Result<RackCatalog> {
        let mut catalog = RackCatalog::builtin();
        if let Some(path) = &self.racks_file {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read racks file {path}"))?;
            let profiles: Vec<RackProfile> =
                serde_json::from_str(&content).context("failed to parse racks file")?;
            for profile in profiles {
                catalog.upsert(profile);
            }
        }
        Ok(catalog)
    }
}
