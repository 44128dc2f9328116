//! Journey synthesizer - step sequences and UI version resolution per relation
//!
//! Every relation source -> target becomes a `Journey`. Its transition label
//! (`normal` or `<source>_to_<target>`) selects one of a fixed set of step
//! templates; the `JourneyRules` table supplies step names and per-step
//! sub UI version overrides.

use serde::Serialize;

use uvm_core::{
    Journey, JourneyRules, JourneyTemplate, LenderConfig, Step, SEARCH_TYPE_LENDER_CONFIG,
};

use crate::classifier::FlowClassifier;
use crate::resolver::RelationReport;

/// Label of a transition between configs of the same flow type
pub const NORMAL_LABEL: &str = "normal";

/// Step template selected by a transition label.
///
/// Priority: self-loop, rejection, automated, CIF, passthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TransitionKind {
    /// Source and target are the same config
    SelfLoop,

    /// Minimal path ending in failure
    Rejection,

    /// Full initial + automated sequence
    Automated { semi: bool },

    /// CIF confirmation, optionally followed by CIF appraisal
    Cif { no_branch: bool },

    /// Target flow verbatim
    Passthrough,
}

impl TransitionKind {
    /// Kind of a transition between two distinct configs
    pub fn from_label(label: &str) -> Self {
        if label.contains("rejection") {
            Self::Rejection
        } else if label.contains("auto") || label.contains("semi") {
            Self::Automated {
                semi: label.contains("semi"),
            }
        } else if label.contains("cif") || label.contains("diff") {
            Self::Cif {
                no_branch: label.contains("no_branch"),
            }
        } else {
            Self::Passthrough
        }
    }

    pub fn between(source: &LenderConfig, target: &LenderConfig, label: &str) -> Self {
        if source.id == target.id {
            Self::SelfLoop
        } else {
            Self::from_label(label)
        }
    }
}

/// `normal` when both configs classify to the same flow type,
/// `<source>_to_<target>` otherwise
pub fn transition_label(source: &LenderConfig, target: &LenderConfig) -> String {
    let source_flow = FlowClassifier::classify_config(source);
    let target_flow = FlowClassifier::classify_config(target);

    if source_flow == target_flow {
        NORMAL_LABEL.to_string()
    } else {
        format!("{}_to_{}", source_flow, target_flow)
    }
}

/// Routing condition derived from a match reason
pub fn condition_for(match_reason: &str) -> &'static str {
    if match_reason.contains("different flow_type") {
        "flow_routing_condition == true"
    } else if match_reason.contains("same product_code") {
        "product_eligibility == true"
    } else if match_reason.contains("same lead_source") {
        "lead_source_match == true"
    } else if match_reason.contains("shared telco_code") {
        "telco_compatibility == true"
    } else {
        "routing_condition == true"
    }
}

/// Human-readable description of a transition label
pub fn description_for(label: &str, target_name: &str) -> String {
    let description = if label.contains("rejection") {
        "Rejection flow"
    } else if label.contains("auto") {
        "Automated flow"
    } else if label.contains("semi") {
        "Semi-automated flow"
    } else if label.contains("manual") {
        "Manual review flow"
    } else if label.contains("cif") {
        "CIF verification flow"
    } else if label.contains("diff") {
        "Different information flow"
    } else if label == NORMAL_LABEL {
        "Normal flow"
    } else {
        return format!("Flow to {}", target_name);
    };
    description.to_string()
}

/// Builds journeys from relations using a rule table
#[derive(Debug, Clone, Default)]
pub struct JourneySynthesizer {
    rules: JourneyRules,
}

impl JourneySynthesizer {
    pub fn new(rules: JourneyRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &JourneyRules {
        &self.rules
    }

    /// The source's own flow, step for step
    pub fn self_loop(&self, source: &LenderConfig) -> Journey {
        Journey {
            id: Journey::journey_id(source.id, source.id),
            flow_type: NORMAL_LABEL.to_string(),
            from_config_id: source.id,
            to_config_id: source.id,
            active: true,
            condition: String::new(),
            description: "Normal flow".to_string(),
            steps: baseline_steps(&source.ui_flow, &source.ui_version),
        }
    }

    /// Journey from `source` to `target`, labeled from their flow types
    pub fn synthesize(
        &self,
        source: &LenderConfig,
        target: &LenderConfig,
        match_reason: &str,
    ) -> Journey {
        if source.id == target.id {
            return self.self_loop(source);
        }

        let label = transition_label(source, target);
        let kind = TransitionKind::between(source, target, &label);

        Journey {
            id: Journey::journey_id(source.id, target.id),
            from_config_id: source.id,
            to_config_id: target.id,
            active: true,
            condition: condition_for(match_reason).to_string(),
            description: description_for(&label, &target.name),
            steps: self.steps(source, target, kind),
            flow_type: label,
        }
    }

    /// Step sequence of a transition kind
    pub fn steps(&self, source: &LenderConfig, target: &LenderConfig, kind: TransitionKind) -> Vec<Step> {
        match kind {
            TransitionKind::SelfLoop => baseline_steps(&source.ui_flow, &source.ui_version),
            TransitionKind::Rejection => self.rejection_steps(source, target),
            TransitionKind::Automated { semi } => self.automated_steps(source, target, semi),
            TransitionKind::Cif { no_branch } => {
                let mut names = vec![self.rules.cif_confirm_step.as_str()];
                if !no_branch && !self.rules.cif_appraisal_step.is_empty() {
                    names.push(self.rules.cif_appraisal_step.as_str());
                }
                baseline_steps(names, &target.ui_version)
            }
            TransitionKind::Passthrough => baseline_steps(&target.ui_flow, &target.ui_version),
        }
    }

    fn rejection_steps(&self, source: &LenderConfig, target: &LenderConfig) -> Vec<Step> {
        let mut steps = Vec::new();

        // Common steps survive only at the matching leading positions of the source flow
        for name in &self.rules.common_steps {
            let position = steps.len();
            if source.ui_flow.get(position) == Some(name) {
                steps.push(Step::baseline(position, name.as_str(), source.ui_version.as_str()));
            }
        }

        for name in &self.rules.rejection_steps {
            steps.push(Step::baseline(steps.len(), name.as_str(), target.ui_version.as_str()));
        }

        steps
    }

    fn automated_steps(&self, source: &LenderConfig, target: &LenderConfig, semi: bool) -> Vec<Step> {
        let initial = self
            .rules
            .initial_steps
            .iter()
            .map(|name| (name, source.ui_version.as_str()));
        let automated = self
            .rules
            .automated_steps
            .iter()
            .map(|name| (name, target.ui_version.as_str()));

        initial
            .chain(automated)
            .enumerate()
            .map(|(id, (name, main_ui_version))| {
                let resolved = self.rules.resolve(name, semi);
                Step {
                    id,
                    name: name.clone(),
                    main_ui_version: main_ui_version.to_string(),
                    sub_ui_version: resolved.sub_ui_version,
                    sub_ui_version_by_conditions: resolved.by_conditions,
                }
            })
            .collect()
    }

    /// Journey template for `source`: the self-loop first, then one journey per
    /// routing target still present in `corpus`. A/B variants get no journeys.
    pub fn build_template(
        &self,
        source: &LenderConfig,
        report: &RelationReport,
        corpus: &[LenderConfig],
    ) -> JourneyTemplate {
        let mut related_config_ids = Vec::new();
        let mut journeys = vec![self.self_loop(source)];

        for related in report.routing_targets() {
            related_config_ids.push(related.config_id);

            match corpus.iter().find(|c| c.id == related.config_id) {
                Some(target) => journeys.push(self.synthesize(source, target, &related.match_reason)),
                None => tracing::warn!(
                    "Skipping journey {}: target config no longer available",
                    Journey::journey_id(source.id, related.config_id)
                ),
            }
        }

        tracing::info!("Generated {} journeys for config {}", journeys.len(), source.id);

        JourneyTemplate {
            search_value: source.id,
            search_type: SEARCH_TYPE_LENDER_CONFIG.to_string(),
            related_config_ids,
            journeys,
        }
    }
}

fn baseline_steps<I, S>(names: I, main_ui_version: &str) -> Vec<Step>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .enumerate()
        .map(|(id, name)| Step::baseline(id, name.as_ref(), main_ui_version))
        .collect()
}
