// UVM Core - Journey resource type
//
// A journey is the synthesized step-by-step path from a source config to a
// related config, with the UI version of every step resolved.

use serde::{Deserialize, Serialize};

/// Search type recorded on journey templates
pub const SEARCH_TYPE_LENDER_CONFIG: &str = "lender_config_id";

/// Runtime-condition dependent UI version rule. The condition is recorded as
/// data (`key=value[, key=value...]`) and never evaluated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubUiVersionByCondition {
    pub condition: String,
    pub sub_ui_version: String,
}

/// How a step's UI version is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Main UI version only
    Baseline,
    /// Static sub UI version override
    Static,
    /// Conditional sub UI version rules
    Conditional,
}

/// A single step of a journey
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: usize,
    pub name: String,
    pub main_ui_version: String,

    /// Empty when the step has no static override
    #[serde(default)]
    pub sub_ui_version: String,

    #[serde(default)]
    pub sub_ui_version_by_conditions: Vec<SubUiVersionByCondition>,
}

impl Step {
    pub fn baseline(id: usize, name: impl Into<String>, main_ui_version: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            main_ui_version: main_ui_version.into(),
            sub_ui_version: String::new(),
            sub_ui_version_by_conditions: Vec::new(),
        }
    }

    pub fn resolution(&self) -> Resolution {
        if !self.sub_ui_version_by_conditions.is_empty() {
            Resolution::Conditional
        } else if !self.sub_ui_version.is_empty() {
            Resolution::Static
        } else {
            Resolution::Baseline
        }
    }

    /// UI version shown when no condition applies
    pub fn effective_ui_version(&self) -> &str {
        if self.sub_ui_version.is_empty() {
            &self.main_ui_version
        } else {
            &self.sub_ui_version
        }
    }
}

/// Directed journey from one config to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journey {
    pub id: String,

    /// Transition label (`normal` or `<source>_to_<target>`)
    pub flow_type: String,

    pub from_config_id: i64,
    pub to_config_id: i64,
    pub active: bool,
    pub condition: String,
    pub description: String,
    pub steps: Vec<Step>,
}

impl Journey {
    pub fn journey_id(from: i64, to: i64) -> String {
        format!("from_{}_to_{}", from, to)
    }

    pub fn is_self_loop(&self) -> bool {
        self.from_config_id == self.to_config_id
    }

    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.name == name)
    }
}

/// All journeys starting at one source config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyTemplate {
    pub search_value: i64,
    pub search_type: String,
    pub related_config_ids: Vec<i64>,
    pub journeys: Vec<Journey>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_resolution_modes() {
        let mut step = Step::baseline(0, "esign.review", "v9.1.5.0");
        assert_eq!(step.resolution(), Resolution::Baseline);
        assert_eq!(step.effective_ui_version(), "v9.1.5.0");

        step.sub_ui_version = "v1.0-auto-nfc".into();
        assert_eq!(step.resolution(), Resolution::Static);
        assert_eq!(step.effective_ui_version(), "v1.0-auto-nfc");

        let conditional = Step {
            sub_ui_version_by_conditions: vec![SubUiVersionByCondition {
                condition: "communication_call=success".into(),
                sub_ui_version: "v1.1-auto".into(),
            }],
            ..Step::baseline(1, "inform.success", "v9.1.5.0")
        };
        assert_eq!(conditional.resolution(), Resolution::Conditional);
    }

    #[test]
    fn test_journey_serializes_expected_fields() {
        let journey = Journey {
            id: Journey::journey_id(9054, 9095),
            flow_type: "normal_to_auto_pcb".into(),
            from_config_id: 9054,
            to_config_id: 9095,
            active: true,
            condition: "flow_routing_condition == true".into(),
            description: "Automated flow".into(),
            steps: vec![Step::baseline(0, "otp", "v9.1.5.0")],
        };

        let value = serde_json::to_value(&journey).unwrap();
        assert_eq!(value["id"], "from_9054_to_9095");
        assert_eq!(value["from_config_id"], 9054);
        assert_eq!(value["steps"][0]["sub_ui_version"], "");
        assert!(value["steps"][0]["sub_ui_version_by_conditions"]
            .as_array()
            .unwrap()
            .is_empty());
        assert!(!journey.is_self_loop());
        assert!(journey.step("otp").is_some());
    }
}
