//! Single-node energy analysis command

use crate::output::{self, OutputFormat};
use anyhow::Result;
use power_lib::{PowerService, Window};

pub async fn run(
    service: &PowerService,
    hostname: &str,
    window: Window,
    format: OutputFormat,
) -> Result<()> {
    let analysis = service.analyze_node(hostname, window).await?;
    output::print_node_analysis(&analysis, format);
    Ok(())
}
