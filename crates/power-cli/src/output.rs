//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use power_lib::{NodeAnalysis, ToleranceBand, ValidationResult};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Format energy in kWh
pub fn format_kwh(kwh: f64) -> String {
    format!("{kwh:.4} kWh")
}

/// Format power in Watts, switching to kW above 10 kW
pub fn format_watts(watts: f64) -> String {
    if watts.abs() >= 10_000.0 {
        format!("{:.2} kW", watts / 1000.0)
    } else {
        format!("{watts:.1} W")
    }
}

/// Color a tolerance band for terminal output
pub fn color_band(band: ToleranceBand) -> String {
    match band {
        ToleranceBand::Good => "GOOD".green().bold().to_string(),
        ToleranceBand::Acceptable => "ACCEPTABLE".yellow().bold().to_string(),
        ToleranceBand::NeedsInvestigation => "NEEDS INVESTIGATION".red().bold().to_string(),
    }
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Samples")]
    samples: usize,
    #[tabled(rename = "Mean Power")]
    mean_power: String,
    #[tabled(rename = "Energy")]
    energy: String,
}

/// Print a per-metric breakdown for one node
pub fn print_node_analysis(analysis: &NodeAnalysis, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(analysis),
        OutputFormat::Table => {
            let rows: Vec<MetricRow> = analysis
                .series
                .iter()
                .map(|s| {
                    let real = s.rows.iter().filter(|r| !r.synthetic).count();
                    let summary = power_lib::PowerSummary::from_rows(&s.rows);
                    MetricRow {
                        metric: s.metric_id.clone(),
                        samples: real,
                        mean_power: format_watts(summary.mean_power_w),
                        energy: format_kwh(s.total_energy_kwh),
                    }
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            println!(
                "  {} over {:.2} h: {}",
                analysis.node_id.bold(),
                analysis.summary.duration_hours,
                format_kwh(analysis.total_energy_kwh).bold()
            );
        }
    }
}

/// Print a rack validation summary
pub fn print_validation(result: &ValidationResult, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Table => {
            println!("{}", result.rack_id.bold());
            println!("  Compute energy:   {}", format_kwh(result.compute_energy_kwh));
            println!("  PDU energy:       {}", format_kwh(result.pdu_energy_kwh));
            println!(
                "  Difference:       {} (adjusted {})",
                format_kwh(result.raw_difference_kwh),
                format_kwh(result.adjusted_difference_kwh)
            );
            match result.difference_ratio {
                Some(ratio) => println!("  Discrepancy:      {:.1}%", ratio * 100.0),
                None => println!("  Discrepancy:      n/a (zero PDU reference)"),
            }
            println!("  Validation:       {}", color_band(result.band));
            if result.zero_reference {
                print_warning("PDU reference reads zero over the window");
            }
            if !result.failed_nodes.is_empty() {
                print_warning(&format!(
                    "{} node(s) excluded (fetch failed): {}",
                    result.failed_nodes.len(),
                    result.failed_nodes.join(", ")
                ));
            }
        }
    }
}

/// Print any serializable payload as pretty JSON
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => print_error(&format!("failed to serialize output: {e}")),
    }
}
