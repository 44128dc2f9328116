use anyhow::{Context, Result};
use comfy_table::{Cell, Color};
use uvm_core::{AbTestingGroup, ConfigRepository, ORIGINAL_VARIANT};
use uvm_routing::Analyzer;

use crate::output;

/// List every A/B testing group in a scope with traffic shares
pub async fn execute<R: ConfigRepository>(
    analyzer: &Analyzer<R>,
    scope: &str,
    output: &str,
) -> Result<()> {
    let groups = analyzer
        .ab_groups(scope)
        .await
        .context("Failed to detect A/B testing groups")?;

    if output::print_structured(&groups, output)? {
        return Ok(());
    }
    match output {
        "wide" => print_groups(&groups),
        other => anyhow::bail!("Unknown output format: {} (expected wide, json or yaml)", other),
    }
    Ok(())
}

fn print_groups(groups: &[AbTestingGroup]) {
    if groups.is_empty() {
        println!("No A/B testing groups found");
        return;
    }

    let mut table = output::table(&["GROUP", "CONFIG ID", "WEIGHT", "SHARE", "DIFFERENCES"]);
    for (i, group) in groups.iter().enumerate() {
        for variant in &group.variants {
            let differences = if variant.differences.iter().any(|d| d == ORIGINAL_VARIANT) {
                output::cell(ORIGINAL_VARIANT, Color::Cyan)
            } else {
                Cell::new(variant.differences.join("\n"))
            };
            table.add_row(vec![
                Cell::new(format!("{}: {}", i + 1, group.group_name)),
                Cell::new(variant.config_id),
                Cell::new(variant.weight),
                Cell::new(output::percent(group.traffic_share(variant.config_id))),
                differences,
            ]);
        }
    }
    println!("{}", table);
    println!("{} group(s)", groups.len());
}
