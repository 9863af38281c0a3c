//! Rack validation command

use crate::output::{self, OutputFormat};
use anyhow::Result;
use power_lib::{PowerService, Window};

pub async fn run(
    service: &PowerService,
    rack_id: &str,
    window: Window,
    format: OutputFormat,
) -> Result<()> {
    let result = service.analyze_rack(rack_id, window).await?;
    output::print_validation(&result, format);
    Ok(())
}
