// UVM Core - Journey rule tables
//
// Step tables and per-step UI version override policies used when a journey
// is synthesized. The built-in table can be replaced by a YAML file so that
// business-rule changes stay out of the matching code.
//
// Example:
// ```yaml
// rejection_steps: [ekyc.selfie.flash, failure]
// overrides:
//   esign.intro:
//     type: static
//     sub_ui_version: v1.0-c1
//   esign.review:
//     type: by_automation
//     semi: v1.0-semi-nfc
//     auto: v1.0-auto-nfc
// ```

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{UvmError, UvmResult};
use crate::journey::SubUiVersionByCondition;

/// Condition clauses are `key=value` pairs separated by commas
const CONDITION_PATTERN: &str =
    r"^\s*[A-Za-z0-9_.]+\s*=\s*[^,=]+(\s*,\s*[A-Za-z0-9_.]+\s*=\s*[^,=]+)*\s*$";

/// One conditional rule; the sub UI version depends on whether the transition
/// is semi-automated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalRule {
    pub condition: String,
    pub semi: String,
    pub auto: String,
}

/// UI version override policy of a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepOverride {
    /// Fixed sub UI version
    Static { sub_ui_version: String },

    /// Static sub UI version chosen by automation mode
    ByAutomation { semi: String, auto: String },

    /// Conditional rules, no static override
    Conditional { rules: Vec<ConditionalRule> },
}

/// Sub UI version resolution of one step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedOverride {
    pub sub_ui_version: String,
    pub by_conditions: Vec<SubUiVersionByCondition>,
}

impl StepOverride {
    pub fn resolve(&self, semi: bool) -> ResolvedOverride {
        let pick = |semi_version: &str, auto_version: &str| {
            if semi {
                semi_version.to_string()
            } else {
                auto_version.to_string()
            }
        };

        match self {
            Self::Static { sub_ui_version } => ResolvedOverride {
                sub_ui_version: sub_ui_version.clone(),
                by_conditions: Vec::new(),
            },
            Self::ByAutomation { semi: s, auto: a } => ResolvedOverride {
                sub_ui_version: pick(s, a),
                by_conditions: Vec::new(),
            },
            Self::Conditional { rules } => ResolvedOverride {
                sub_ui_version: String::new(),
                by_conditions: rules
                    .iter()
                    .map(|rule| SubUiVersionByCondition {
                        condition: rule.condition.clone(),
                        sub_ui_version: pick(&rule.semi, &rule.auto),
                    })
                    .collect(),
            },
        }
    }
}

/// Step tables and override policies for journey synthesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JourneyRules {
    /// Leading steps a rejection journey keeps from the source flow
    pub common_steps: Vec<String>,

    /// Terminal steps of a rejection journey
    pub rejection_steps: Vec<String>,

    /// First half of an automated journey (source UI version)
    pub initial_steps: Vec<String>,

    /// Second half of an automated journey (target UI version)
    pub automated_steps: Vec<String>,

    pub cif_confirm_step: String,

    /// Omitted for `no_branch` transitions
    pub cif_appraisal_step: String,

    /// Step name -> override policy for automated journeys
    pub overrides: BTreeMap<String, StepOverride>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for JourneyRules {
    fn default() -> Self {
        let mut overrides = BTreeMap::new();
        for step in ["app_form.contact_info", "appraising.fifth_approval", "esign.intro"] {
            overrides.insert(
                step.to_string(),
                StepOverride::Static {
                    sub_ui_version: "v1.0-c1".to_string(),
                },
            );
        }
        overrides.insert(
            "esign.review".to_string(),
            StepOverride::ByAutomation {
                semi: "v1.0-semi-nfc".to_string(),
                auto: "v1.0-auto-nfc".to_string(),
            },
        );
        overrides.insert(
            "inform.success".to_string(),
            StepOverride::Conditional {
                rules: vec![ConditionalRule {
                    condition: "communication_call=success, lead_source=organic".to_string(),
                    semi: "v1.1-semi".to_string(),
                    auto: "v1.1-auto".to_string(),
                }],
            },
        );

        Self {
            common_steps: strings(&["otp", "app_form.basic_info"]),
            rejection_steps: strings(&["ekyc.selfie.flash", "failure"]),
            initial_steps: strings(&[
                "otp",
                "app_form.basic_info",
                "appraising.quick_approval",
                "app_form.personal_info",
                "ekyc.selfie.active",
                "appraising.second_approval",
                "ekyc.id_card",
                "ekyc.confirm",
                "appraising.third_approval",
                "appraising.fourth_approval",
            ]),
            automated_steps: strings(&[
                "inform.success",
                "app_form.contact_info",
                "appraising.fifth_approval",
                "esign.intro",
                "esign.review",
                "esign.otp",
                "app_form.card_design",
                "app_form.personalize_reward",
                "ekyc.nfc_scan",
                "appraising.nfc_verify",
            ]),
            cif_confirm_step: "cif.confirm".to_string(),
            cif_appraisal_step: "appraising.cif".to_string(),
            overrides,
        }
    }
}

impl JourneyRules {
    /// Parse and validate rules from YAML. Missing fields keep their built-in values.
    pub fn from_yaml_str(content: &str) -> UvmResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(content);
        let rules: JourneyRules = serde_path_to_error::deserialize(deserializer)
            .map_err(|e| UvmError::Rules(format!("{} (at {})", e.inner(), e.path())))?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn from_yaml_file(path: &Path) -> UvmResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let rules = Self::from_yaml_str(&content)?;
        tracing::info!("Loaded journey rules from {}", path.display());
        Ok(rules)
    }

    pub fn to_yaml(&self) -> UvmResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Override resolution for a step; steps without a policy resolve to the baseline
    pub fn resolve(&self, step: &str, semi: bool) -> ResolvedOverride {
        self.overrides
            .get(step)
            .map(|policy| policy.resolve(semi))
            .unwrap_or_default()
    }

    pub fn validate(&self) -> UvmResult<()> {
        if self.rejection_steps.is_empty() {
            return Err(UvmError::Rules("rejection_steps must not be empty".into()));
        }
        if self.cif_confirm_step.trim().is_empty() {
            return Err(UvmError::Rules("cif_confirm_step is required".into()));
        }

        let condition_re =
            Regex::new(CONDITION_PATTERN).map_err(|e| UvmError::Rules(e.to_string()))?;

        for (step, policy) in &self.overrides {
            if step.trim().is_empty() {
                return Err(UvmError::Rules("override with empty step name".into()));
            }
            match policy {
                StepOverride::Static { sub_ui_version } if sub_ui_version.is_empty() => {
                    return Err(UvmError::Rules(format!(
                        "{}: static override needs a sub_ui_version",
                        step
                    )));
                }
                StepOverride::ByAutomation { semi, auto } if semi.is_empty() || auto.is_empty() => {
                    return Err(UvmError::Rules(format!(
                        "{}: both semi and auto versions are required",
                        step
                    )));
                }
                StepOverride::Conditional { rules } => {
                    if rules.is_empty() {
                        return Err(UvmError::Rules(format!(
                            "{}: conditional override without rules",
                            step
                        )));
                    }
                    if let Some(bad) = rules.iter().find(|r| !condition_re.is_match(&r.condition)) {
                        return Err(UvmError::Rules(format!(
                            "{}: malformed condition '{}'",
                            step, bad.condition
                        )));
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}
