//! Terminal rendering of journeys and journey templates

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use uvm_core::{Journey, JourneyTemplate, Resolution, Step};

use crate::RenderConfig;

/// Marker of a step's UI version resolution
pub fn resolution_marker(resolution: Resolution, unicode: bool) -> &'static str {
    match (resolution, unicode) {
        (Resolution::Baseline, true) => "○",
        (Resolution::Static, true) => "◆",
        (Resolution::Conditional, true) => "◇",
        (Resolution::Baseline, false) => "[ ]",
        (Resolution::Static, false) => "[*]",
        (Resolution::Conditional, false) => "[?]",
    }
}

/// Pad `text` with spaces to a display width of `width`
fn pad(text: &str, width: usize) -> String {
    let shown = text.width();
    if shown >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - shown))
    }
}

/// Cut `text` to at most `width` columns, marking the cut with an ellipsis
fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Renders journeys for the terminal
pub struct JourneyRenderer {
    config: RenderConfig,
}

impl JourneyRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    fn marker(&self, step: &Step) -> String {
        let resolution = step.resolution();
        let marker = resolution_marker(resolution, self.config.use_unicode);
        if !self.config.use_colors {
            return marker.to_string();
        }
        match resolution {
            Resolution::Baseline => marker.green().to_string(),
            Resolution::Static => marker.yellow().to_string(),
            Resolution::Conditional => marker.magenta().to_string(),
        }
    }

    fn version_text(&self, step: &Step) -> String {
        match step.resolution() {
            Resolution::Baseline => step.main_ui_version.clone(),
            Resolution::Static => {
                format!("{} (main: {})", step.sub_ui_version, step.main_ui_version)
            }
            Resolution::Conditional if self.config.compact => format!(
                "{} +{} rule(s)",
                step.main_ui_version,
                step.sub_ui_version_by_conditions.len()
            ),
            Resolution::Conditional => step.main_ui_version.clone(),
        }
    }

    /// Journey title line(s)
    pub fn render_header(&self, journey: &Journey) -> String {
        let title = if self.config.use_colors {
            journey.id.bold().cyan().to_string()
        } else {
            journey.id.clone()
        };

        if self.config.compact {
            return format!("{} ({})", title, journey.flow_type);
        }

        let mut lines = vec![
            format!("Journey: {}", title),
            format!("Flow: {} | {}", journey.flow_type, journey.description),
        ];
        if !journey.condition.is_empty() {
            lines.push(format!("Condition: {}", journey.condition));
        }
        lines.join("\n")
    }

    /// One line per step, names aligned to a common column
    pub fn render_linear(&self, journey: &Journey) -> String {
        let name_limit = (self.config.max_width / 2).max(8);
        let names: Vec<String> = journey
            .steps
            .iter()
            .map(|s| truncate(&s.name, name_limit))
            .collect();
        let column = names.iter().map(|n| n.width()).max().unwrap_or(0);
        let connector = if self.config.use_unicode { "│" } else { "|" };
        let branch = if self.config.use_unicode { "└─" } else { "`-" };

        let mut lines = Vec::new();
        for (i, (step, name)) in journey.steps.iter().zip(&names).enumerate() {
            lines.push(format!(
                "{} {:>2} {}  {}",
                self.marker(step),
                step.id,
                pad(name, column),
                self.version_text(step)
            ));

            if !self.config.compact {
                for rule in &step.sub_ui_version_by_conditions {
                    lines.push(format!(
                        "{}    {} if {} -> {}",
                        connector, branch, rule.condition, rule.sub_ui_version
                    ));
                }
                if i + 1 < journey.steps.len() {
                    lines.push(connector.to_string());
                }
            }
        }

        lines.join("\n")
    }

    /// Steps on one line, overridden versions in brackets
    pub fn render_inline(&self, journey: &Journey) -> String {
        let arrow = if self.config.use_unicode { " → " } else { " -> " };
        journey
            .steps
            .iter()
            .map(|step| match step.resolution() {
                Resolution::Baseline => step.name.clone(),
                Resolution::Static => format!("{}[{}]", step.name, step.sub_ui_version),
                Resolution::Conditional => format!("{}[?]", step.name),
            })
            .collect::<Vec<_>>()
            .join(arrow)
    }

    /// Header plus steps of a journey
    pub fn render(&self, journey: &Journey) -> String {
        format!("{}\n{}", self.render_header(journey), self.render_linear(journey))
    }

    /// Overview of every journey in a template
    pub fn render_summary(&self, template: &JourneyTemplate) -> String {
        if self.config.compact {
            return format!(
                "Config {}: {} journeys, {} related",
                template.search_value,
                template.journeys.len(),
                template.related_config_ids.len()
            );
        }

        let column = template
            .journeys
            .iter()
            .map(|j| j.id.width())
            .max()
            .unwrap_or(0);
        let mut lines = vec![format!(
            "Config {} ({} journeys)",
            template.search_value,
            template.journeys.len()
        )];
        for journey in &template.journeys {
            lines.push(format!(
                "  {}  {:>2} steps  {}",
                pad(&journey.id, column),
                journey.steps.len(),
                journey.description
            ));
        }
        lines.join("\n")
    }
}

impl Default for JourneyRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}
