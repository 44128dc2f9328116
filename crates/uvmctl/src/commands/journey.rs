use anyhow::{Context, Result};
use uvm_core::ConfigRepository;
use uvm_routing::Analyzer;
use uvm_viz::{JourneyRenderer, RenderConfig};

use crate::output;

/// Show every journey from a source config
pub async fn execute<R: ConfigRepository>(
    analyzer: &Analyzer<R>,
    id: i64,
    lead_source: Option<&str>,
    scope: &str,
    output: &str,
) -> Result<()> {
    let template = analyzer
        .journey_template(id, lead_source, scope)
        .await
        .with_context(|| format!("Failed to build journeys for config {}", id))?;

    if output::print_structured(&template, output)? {
        return Ok(());
    }
    if output != "text" {
        anyhow::bail!("Unknown output format: {} (expected text, json or yaml)", output);
    }

    let config = if output::use_colors() {
        RenderConfig::terminal()
    } else {
        RenderConfig::default()
    };
    let renderer = JourneyRenderer::new(config);

    println!("{}", renderer.render_summary(&template));
    for journey in &template.journeys {
        println!();
        println!("{}", renderer.render(journey));
    }
    Ok(())
}
