//! Rack power analysis CLI
//!
//! Runs energy accounting and rack validation over per-node sample exports.
//! The live database fetch path plugs in behind the same `SampleSource` trait
//! this binary uses for files.

mod commands;
mod config;
mod output;
mod source;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use power_lib::{PowerService, Window};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Rack power analysis and validation
#[derive(Parser)]
#[command(name = "rackpower")]
#[command(author, version, about = "Energy accounting and rack power validation", long_about = None)]
pub struct Cli {
    /// Directory of per-node JSON sample exports
    #[arg(long, env = "RACKPOWER_DATA_DIR")]
    pub data: Option<String>,

    /// Window start, UTC (YYYY-MM-DD HH:MM:SS); defaults to end minus the
    /// configured window length
    #[arg(long, global = true)]
    pub start: Option<String>,

    /// Window end, UTC (YYYY-MM-DD HH:MM:SS); defaults to now
    #[arg(long, global = true)]
    pub end: Option<String>,

    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze energy consumption for a single node
    Node {
        /// Node hostname (rpc-*, rpg-*, pdu-*, irc-*)
        hostname: String,
    },

    /// Validate a rack's compute energy against its PDUs
    Rack {
        /// Rack id (rack-91 .. rack-97, or bare number)
        rack_id: String,
    },

    /// Analyze a set of nodes with per-node failure capture
    Multi {
        /// Node hostnames
        hostnames: Vec<String>,
    },
}

/// Parse a window from the CLI flags, falling back on the configured
/// default length ending now
fn resolve_window(
    start: Option<&str>,
    end: Option<&str>,
    default_hours: i64,
) -> Result<Window> {
    let parse = |s: &str| -> Result<chrono::DateTime<Utc>> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .map(|dt| dt.and_utc())
            .with_context(|| format!("invalid time {s:?}, expected YYYY-MM-DD HH:MM:SS"))
    };

    let end = match end {
        Some(s) => parse(s)?,
        None => Utc::now(),
    };
    let start = match start {
        Some(s) => parse(s)?,
        None => end - Duration::hours(default_hours),
    };
    Ok(Window::new(start, end)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = config::CliConfig::load()?;

    let data_dir = cli.data.clone().unwrap_or_else(|| cfg.data_dir.clone());
    let source = Arc::new(source::JsonDirSource::new(&data_dir));
    let service = PowerService::new(source, cfg.rack_catalog()?);

    let window = resolve_window(
        cli.start.as_deref(),
        cli.end.as_deref(),
        cfg.default_window_hours,
    )?;

    match &cli.command {
        Commands::Node { hostname } => {
            commands::node::run(&service, hostname, window, cli.format).await?;
        }
        Commands::Rack { rack_id } => {
            commands::rack::run(&service, rack_id, window, cli.format).await?;
        }
        Commands::Multi { hostnames } => {
            commands::multi::run(&service, hostnames, window, cli.format).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_window_explicit() {
        let window = resolve_window(
            Some("2025-01-01 10:00:00"),
            Some("2025-01-01 11:00:00"),
            24,
        )
        .unwrap();
        assert!((window.elapsed_hours() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_window_defaults_to_configured_length() {
        let window = resolve_window(None, Some("2025-01-01 12:00:00"), 6).unwrap();
        assert!((window.elapsed_hours() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_window_rejects_inversion() {
        assert!(resolve_window(
            Some("2025-01-01 11:00:00"),
            Some("2025-01-01 10:00:00"),
            24
        )
        .is_err());
    }

    #[test]
    fn test_resolve_window_rejects_garbage() {
        assert!(resolve_window(Some("yesterday"), None, 24).is_err());
    }
}
