//! Multi-node energy analysis command

use crate::output::{self, OutputFormat};
use anyhow::Result;
use colored::Colorize;
use power_lib::{PowerService, Window};
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct NodeTotalRow {
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Energy")]
    energy: String,
}

pub async fn run(
    service: &PowerService,
    hostnames: &[String],
    window: Window,
    format: OutputFormat,
) -> Result<()> {
    let results = service.analyze_multi(hostnames, window).await;

    match format {
        OutputFormat::Json => {
            // json output carries full analyses for succeeded nodes and the
            // error message for failed ones
            let payload: serde_json::Map<String, serde_json::Value> = results
                .iter()
                .map(|(node, outcome)| {
                    let value = match outcome {
                        Ok(analysis) => serde_json::to_value(analysis).unwrap_or_default(),
                        Err(err) => serde_json::json!({ "error": err.to_string() }),
                    };
                    (node.clone(), value)
                })
                .collect();
            output::print_json(&payload);
        }
        OutputFormat::Table => {
            let mut failed = 0usize;
            let mut total_kwh = 0.0;
            let rows: Vec<NodeTotalRow> = results
                .iter()
                .map(|(node, outcome)| match outcome {
                    Ok(analysis) => {
                        total_kwh += analysis.total_energy_kwh;
                        NodeTotalRow {
                            node: node.clone(),
                            status: "ok".green().to_string(),
                            energy: output::format_kwh(analysis.total_energy_kwh),
                        }
                    }
                    Err(err) => {
                        failed += 1;
                        NodeTotalRow {
                            node: node.clone(),
                            status: "failed".red().to_string(),
                            energy: err.to_string(),
                        }
                    }
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            output::print_success(&format!(
                "{} node(s) analyzed, total {}",
                results.len() - failed,
                output::format_kwh(total_kwh)
            ));
            if failed > 0 {
                output::print_warning(&format!("{failed} node(s) failed"));
            }
        }
    }

    Ok(())
}
