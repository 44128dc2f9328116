//! PlantUML text for A/B groups, journey overviews and journey steps
//!
//! Only the diagram source is produced; rendering to images is left to an
//! external PlantUML installation.

use std::collections::HashSet;
use std::fmt::Write;

use uvm_core::{AbTestingGroup, Journey, JourneyTemplate, Resolution, Step};

const PALETTE: &str = "\
!$PRIMARY = \"#2196F3\"
!$SUCCESS = \"#4CAF50\"
!$WARNING = \"#ff9800\"
!$DANGER = \"#e51c23\"
!$INFO = \"#9C27B0\"
!$WHITE = \"#FFF\"
!$DARK = \"#222\"
";

/// Theme color of a journey target, by transition label
pub fn label_color(flow_type: &str) -> &'static str {
    if flow_type.contains("rejection") {
        "$DANGER"
    } else if flow_type.contains("auto") {
        "$WARNING"
    } else if flow_type.contains("semi") {
        "$INFO"
    } else if flow_type.contains("cif") {
        "$PRIMARY"
    } else {
        "$SUCCESS"
    }
}

/// Replace characters that are unsafe in file names with `_`
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}

/// Condition text readable inside an activity diamond
fn condition_text(condition: &str) -> String {
    condition
        .replace("==", "equals")
        .replace("&&", "and")
        .replace("||", "or")
        .replace(',', " and")
}

/// Fallback UI version text of a step, main version in parentheses when overridden
fn fallback_text(step: &Step) -> String {
    if step.sub_ui_version.is_empty() {
        step.main_ui_version.clone()
    } else {
        format!("{}\\n(Main: {})", step.sub_ui_version, step.main_ui_version)
    }
}

/// Renders analysis documents as PlantUML source
#[derive(Debug, Clone, Copy, Default)]
pub struct PlantUmlRenderer;

impl PlantUmlRenderer {
    pub fn new() -> Self {
        Self
    }

    /// One package per group, one rectangle per variant with its traffic share
    pub fn ab_groups(&self, groups: &[AbTestingGroup]) -> String {
        let mut puml = String::from("@startuml\ntitle A/B Testing Groups Analysis\n\n");

        for (i, group) in groups.iter().enumerate() {
            let _ = writeln!(puml, "package \"Group {}: {}\" {{", i + 1, group.group_name);
            for (j, variant) in group.variants.iter().enumerate() {
                let _ = writeln!(
                    puml,
                    "  rectangle \"Config {}\\nWeight: {} ({:.1}%)\" as config_{}_{}",
                    variant.config_id,
                    variant.weight,
                    group.traffic_share(variant.config_id) * 100.0,
                    i,
                    j
                );
            }
            puml.push_str("}\n\n");
        }

        puml.push_str("@enduml\n");
        puml
    }

    /// Source config, one node per distinct target and an arrow per journey
    pub fn journey_flow(&self, template: &JourneyTemplate) -> String {
        let source = template.search_value;
        let mut puml = String::from("@startuml\n");
        puml.push_str(PALETTE);
        puml.push_str(
            "\nskinparam rectangle {\n  BackgroundColor $PRIMARY\n  BorderColor $PRIMARY\n  FontColor $WHITE\n  BorderThickness 2\n}\n\n",
        );
        puml.push_str("skinparam arrow {\n  Color $DARK\n  FontColor $DARK\n  Thickness 2\n}\n\n");
        let _ = writeln!(puml, "title Journey Flow Analysis - Config {}\n", source);
        let _ = writeln!(
            puml,
            "rectangle \"Config {}\\n(Source)\" as config_{} #2196F3",
            source, source
        );

        let mut seen = HashSet::new();
        for journey in &template.journeys {
            if journey.to_config_id == source || !seen.insert(journey.to_config_id) {
                continue;
            }
            let _ = writeln!(
                puml,
                "rectangle \"Config {}\\n{}\" as config_{} {}",
                journey.to_config_id,
                journey.description,
                journey.to_config_id,
                label_color(&journey.flow_type)
            );
        }
        puml.push('\n');

        for journey in template.journeys.iter().filter(|j| !j.is_self_loop()) {
            let _ = writeln!(
                puml,
                "config_{} --> config_{} : {}",
                journey.from_config_id, journey.to_config_id, journey.flow_type
            );
        }

        puml.push_str(
            "\nlegend right\n  |Color|Flow Type|\n  |<#2196F3>|Source / CIF Verification|\n  |<#4CAF50>|Normal Flow|\n  |<#ff9800>|Automated Flow|\n  |<#9C27B0>|Semi-Automated Flow|\n  |<#e51c23>|Rejection Flow|\nendlegend\n",
        );
        puml.push_str("\n@enduml\n");
        puml
    }

    /// Activity diagram of one journey; conditional steps become branches
    pub fn journey_steps(&self, journey: &Journey) -> String {
        let mut puml = String::from("@startuml\n");
        puml.push_str(PALETTE);
        puml.push_str(
            "\nskinparam activity {\n  BackgroundColor $PRIMARY\n  BorderColor $PRIMARY\n  FontColor $WHITE\n  StartColor $SUCCESS\n  EndColor $DANGER\n  DiamondBackgroundColor $WARNING\n  DiamondFontColor $DARK\n}\n\n",
        );
        let _ = writeln!(puml, "title Journey Steps - {} - {}\n", journey.id, journey.description);
        puml.push_str("start\n");

        let blocks: Vec<String> = journey.steps.iter().map(step_block).collect();
        puml.push_str(&blocks.join("\n"));

        puml.push_str("\nstop\n\nnote right\nJourney Information:\n");
        let _ = writeln!(puml, "Flow Type: {}", journey.flow_type);
        let _ = writeln!(puml, "From Config: {}", journey.from_config_id);
        let _ = writeln!(puml, "To Config: {}", journey.to_config_id);
        if !journey.condition.is_empty() {
            let _ = writeln!(puml, "Condition: {}", journey.condition);
        }
        puml.push_str("end note\n\n@enduml\n");
        puml
    }
}

fn step_block(step: &Step) -> String {
    let label = format!("Step {}: {}", step.id, step.name);

    match step.resolution() {
        Resolution::Conditional => {
            let mut block = format!(":{};\n", label);
            for (i, rule) in step.sub_ui_version_by_conditions.iter().enumerate() {
                let keyword = if i == 0 { "if" } else { "elseif" };
                let _ = writeln!(
                    block,
                    "{} ({}?) then (yes)\n  :Use UI Version\\n{};",
                    keyword,
                    condition_text(&rule.condition),
                    rule.sub_ui_version
                );
            }
            let _ = writeln!(block, "else (no)\n  :Use UI Version\\n{};\nendif", fallback_text(step));
            block
        }
        Resolution::Static | Resolution::Baseline => {
            format!(":{}\\nUI Version: {};\n", label, fallback_text(step))
        }
    }
}
