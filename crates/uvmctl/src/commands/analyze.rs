use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use uvm_core::{tag_names, AbTestingAnalysis, ConfigRepository, JourneyTemplate, LenderConfig};
use uvm_routing::Analyzer;
use uvm_viz::{sanitize_filename, PlantUmlRenderer};

use crate::output::{self, Progress};

/// Documents produced by `uvmctl analyze`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// A/B analysis, journeys and a summary report
    Complete,
    /// A/B analysis only
    AbTesting,
    /// Journeys only
    Journey,
}

impl Mode {
    fn ab_testing(self) -> bool {
        matches!(self, Mode::Complete | Mode::AbTesting)
    }

    fn journey(self) -> bool {
        matches!(self, Mode::Complete | Mode::Journey)
    }
}

/// Lead source used in file names: the override, else the lead source the
/// source is matched on
pub fn lead_source_label(lead_source: Option<&str>, source: &LenderConfig) -> String {
    lead_source
        .filter(|ls| !ls.is_empty())
        .or_else(|| source.tags.single(tag_names::LEAD_SOURCE))
        .unwrap_or("all")
        .to_string()
}

/// File layout of one analysis under `<output-dir>/<id>/`
#[derive(Debug, Clone)]
pub struct AnalysisPaths {
    dir: PathBuf,
    id: i64,
    lead_source: String,
}

impl AnalysisPaths {
    pub fn new(output_dir: &Path, id: i64, lead_source: &str) -> Self {
        Self {
            dir: output_dir.join(id.to_string()),
            id,
            lead_source: lead_source.to_string(),
        }
    }

    fn file(&self, prefix: &str, extension: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}_{}.{}", prefix, self.id, self.lead_source, extension))
    }

    fn puml(&self, name: String) -> PathBuf {
        self.dir.join("pumls").join(name)
    }

    pub fn ab_analysis(&self) -> PathBuf {
        self.file("ab_testing_analysis", "json")
    }

    pub fn journey_analysis(&self) -> PathBuf {
        self.file("journey_analysis", "json")
    }

    pub fn summary_report(&self) -> PathBuf {
        self.file("summary_report", "md")
    }

    pub fn ab_groups_puml(&self) -> PathBuf {
        self.puml(format!("ab_testing_groups_{}_{}.puml", self.id, self.lead_source))
    }

    pub fn journey_flow_puml(&self) -> PathBuf {
        self.puml(format!("journey_flow_{}_{}.puml", self.id, self.lead_source))
    }

    pub fn journey_steps_puml(&self, journey_id: &str) -> PathBuf {
        self.puml(format!(
            "journey_steps_{}_{}_{}.puml",
            self.id,
            self.lead_source,
            sanitize_filename(journey_id)
        ))
    }
}

/// Run an analysis of config `id` and write its documents
pub async fn execute<R: ConfigRepository>(
    analyzer: &Analyzer<R>,
    id: i64,
    lead_source: Option<&str>,
    scope: &str,
    mode: Mode,
    output_dir: &Path,
) -> Result<()> {
    let progress = Progress::new();
    let analysis = analyzer
        .analyze(id, lead_source, scope)
        .await
        .with_context(|| format!("Analysis of config {} failed", id))?;

    let label = lead_source_label(lead_source, &analysis.source);
    let paths = AnalysisPaths::new(output_dir, id, &label);
    let renderer = PlantUmlRenderer::new();

    progress.info(&format!("Config: {} ({})", id, analysis.source.name));
    progress.info(&format!("Lead source: {}", label));

    if mode.ab_testing() {
        progress.section("A/B Testing Analysis");
        let ab = &analysis.ab_analysis;
        progress.info(&format!(
            "{} A/B testing group(s), {} normal result(s)",
            ab.ab_testing_groups.len(),
            ab.normal_results.len()
        ));

        output::write_json(&paths.ab_analysis(), ab)?;
        progress.written(&paths.ab_analysis());

        if !ab.ab_testing_groups.is_empty() {
            output::write_file(&paths.ab_groups_puml(), &renderer.ab_groups(&ab.ab_testing_groups))?;
            progress.written(&paths.ab_groups_puml());
        }
    }

    if mode.journey() {
        progress.section("Journey Analysis");
        let template = &analysis.template;
        progress.info(&format!(
            "{} journey(s) to {} related config(s)",
            template.journeys.len(),
            template.related_config_ids.len()
        ));

        output::write_json(&paths.journey_analysis(), template)?;
        progress.written(&paths.journey_analysis());

        output::write_file(&paths.journey_flow_puml(), &renderer.journey_flow(template))?;
        progress.written(&paths.journey_flow_puml());

        for journey in &template.journeys {
            let path = paths.journey_steps_puml(&journey.id);
            output::write_file(&path, &renderer.journey_steps(journey))?;
            progress.written(&path);
        }
    }

    if mode == Mode::Complete {
        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let report = summary_report(
            &paths,
            &generated,
            Some(&analysis.ab_analysis),
            Some(&analysis.template),
        );
        output::write_file(&paths.summary_report(), &report)?;
        progress.section("Summary Report");
        progress.written(&paths.summary_report());
    }

    progress.done(&format!("Analysis of config {} completed", id));
    Ok(())
}

/// Markdown overview of the documents written for one analysis
pub fn summary_report(
    paths: &AnalysisPaths,
    generated: &str,
    ab: Option<&AbTestingAnalysis>,
    template: Option<&JourneyTemplate>,
) -> String {
    let mut report = String::new();
    let _ = writeln!(report, "# Complete Analysis Report - Config {}\n", paths.id);
    let _ = writeln!(report, "**Lead Source:** {}", paths.lead_source);
    let _ = writeln!(report, "**Generated:** {}\n", generated);

    if let Some(ab) = ab {
        report.push_str("## A/B Testing Analysis\n\n");
        let _ = writeln!(
            report,
            "- **Total A/B Testing Groups:** {}",
            ab.ab_testing_groups.len()
        );
        for (i, group) in ab.ab_testing_groups.iter().enumerate() {
            let _ = writeln!(
                report,
                "- **Group {}:** {} ({} variants, total weight: {})",
                i + 1,
                group.group_name,
                group.variants.len(),
                group.total_weight
            );
            for (j, variant) in group.variants.iter().enumerate() {
                let _ = writeln!(
                    report,
                    "  - Variant {}: Config {} (weight: {}, {} steps)",
                    j + 1,
                    variant.config_id,
                    variant.weight,
                    variant.ui_flow.len()
                );
            }
        }
        let _ = writeln!(
            report,
            "- **Normal Results:** {} configs\n",
            ab.normal_results.len()
        );
    }

    if let Some(template) = template {
        report.push_str("## Journey Analysis\n\n");
        let _ = writeln!(report, "- **Total Journeys:** {}", template.journeys.len());
        let related: Vec<String> = template
            .related_config_ids
            .iter()
            .map(|id| id.to_string())
            .collect();
        let _ = writeln!(report, "- **Related Config IDs:** [{}]\n", related.join(", "));

        let mut flow_types: BTreeMap<&str, usize> = BTreeMap::new();
        for journey in &template.journeys {
            *flow_types.entry(journey.flow_type.as_str()).or_default() += 1;
        }
        report.push_str("### Journey Flow Types:\n");
        for (flow_type, count) in flow_types {
            let _ = writeln!(report, "- **{}:** {} journeys", flow_type, count);
        }
        report.push('\n');
    }

    report.push_str("## Generated Files\n\n");
    let files = [
        (paths.ab_analysis(), "A/B Testing Analysis (JSON)"),
        (paths.journey_analysis(), "Journey Analysis (JSON)"),
        (paths.ab_groups_puml(), "A/B Testing Groups Diagram (PlantUML)"),
        (paths.journey_flow_puml(), "Journey Flow Diagram (PlantUML)"),
    ];
    for (path, description) in files {
        let missing = if path.exists() { "" } else { " (not generated)" };
        let _ = writeln!(
            report,
            "- **{}:** `{}`{}",
            description,
            path.display(),
            missing
        );
    }

    report
}
