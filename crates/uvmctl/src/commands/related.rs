use anyhow::{Context, Result};
use comfy_table::{Cell, Color};
use uvm_core::ConfigRepository;
use uvm_routing::{Analyzer, RelationReport};

use crate::output;

/// List routing targets and A/B variants of a source config
pub async fn execute<R: ConfigRepository>(
    analyzer: &Analyzer<R>,
    id: i64,
    lead_source: Option<&str>,
    scope: &str,
    output: &str,
) -> Result<()> {
    let report = analyzer
        .search_related(id, lead_source, scope)
        .await
        .with_context(|| format!("Failed to search configs related to {}", id))?;

    if output::print_structured(&report.related, output)? {
        return Ok(());
    }
    match output {
        "wide" => print_report(id, &report),
        other => anyhow::bail!("Unknown output format: {} (expected wide, json or yaml)", other),
    }
    Ok(())
}

fn print_report(id: i64, report: &RelationReport) {
    if report.related.is_empty() {
        println!("No configs related to {}", id);
        return;
    }

    let mut table = output::table(&[
        "CONFIG ID",
        "NAME",
        "FLOW TYPE",
        "UI VERSION",
        "WEIGHT",
        "KIND",
        "MATCH REASON",
    ]);
    for result in &report.related {
        let kind = if result.is_ab_testing {
            output::cell("a/b variant", Color::Magenta)
        } else {
            output::cell("routing", Color::Green)
        };
        table.add_row(vec![
            Cell::new(result.config_id),
            Cell::new(&result.name),
            Cell::new(&result.flow_type),
            Cell::new(&result.ui_version),
            Cell::new(result.weight),
            kind,
            Cell::new(&result.match_reason),
        ]);
    }
    println!("{}", table);

    if let Some(group) = &report.ab_group {
        let shares: Vec<String> = group
            .variants
            .iter()
            .map(|v| {
                format!(
                    "{} ({})",
                    v.config_id,
                    output::percent(group.traffic_share(v.config_id))
                )
            })
            .collect();
        println!("A/B group {}: {}", group.group_name, shares.join(", "));
    }
}
