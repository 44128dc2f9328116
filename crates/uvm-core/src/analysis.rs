// UVM Core - Analysis result documents
//
// Output shapes consumed by renderers and report writers. Everything here is
// computed fresh per query and serialized as-is.

use serde::{Deserialize, Serialize};

use crate::config::Tag;

/// Search type recorded on A/B testing analysis documents
pub const SEARCH_TYPE_AB_TESTING: &str = "ab_testing_analysis";

/// Differences label used for the first member of a group
pub const ORIGINAL_VARIANT: &str = "Original variant";

/// A config found related to a source config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedConfigResult {
    pub config_id: i64,
    pub name: String,
    pub flow_type: String,
    pub ui_version: String,
    pub weight: i64,

    /// Human-readable signals, comma separated, in evaluation order
    pub match_reason: String,

    #[serde(default)]
    pub matched_tags: Vec<Tag>,

    /// The candidate is an A/B variant of the source rather than a routing target
    #[serde(default)]
    pub is_ab_testing: bool,

    #[serde(default)]
    pub ab_testing_group: String,

    #[serde(default)]
    pub ab_variants: Vec<i64>,
}

/// One member of an A/B testing group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbTestingVariant {
    pub config_id: i64,
    pub name: String,
    pub weight: i64,
    pub ui_flow: Vec<String>,
    pub differences: Vec<String>,
}

/// Configs sharing name and critical tags but splitting traffic across UI flows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbTestingGroup {
    pub group_name: String,
    pub variants: Vec<AbTestingVariant>,
    pub total_weight: i64,
}

impl AbTestingGroup {
    /// Start a group from its original variant
    pub fn new(original: AbTestingVariant) -> Self {
        Self {
            group_name: original.name.clone(),
            total_weight: original.weight,
            variants: vec![original],
        }
    }

    /// Add a member; the total saturates at `i64::MAX`
    pub fn push(&mut self, variant: AbTestingVariant) {
        self.total_weight = self.total_weight.saturating_add(variant.weight);
        self.variants.push(variant);
    }

    /// Traffic share of a member in `[0, 1]`; zero when the group carries no weight
    pub fn traffic_share(&self, config_id: i64) -> f64 {
        if self.total_weight <= 0 {
            return 0.0;
        }
        self.variants
            .iter()
            .find(|v| v.config_id == config_id)
            .map(|v| v.weight as f64 / self.total_weight as f64)
            .unwrap_or(0.0)
    }

    pub fn variant_ids(&self) -> Vec<i64> {
        self.variants.iter().map(|v| v.config_id).collect()
    }
}

/// A/B testing analysis document for one source config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbTestingAnalysis {
    pub search_id: i64,
    pub search_type: String,
    pub ab_testing_groups: Vec<AbTestingGroup>,
    pub normal_results: Vec<RelatedConfigResult>,
    pub total_results: usize,
}

impl AbTestingAnalysis {
    pub fn new(
        search_id: i64,
        ab_testing_groups: Vec<AbTestingGroup>,
        related: &[RelatedConfigResult],
    ) -> Self {
        let normal_results: Vec<RelatedConfigResult> = related
            .iter()
            .filter(|r| !r.is_ab_testing)
            .cloned()
            .collect();
        Self {
            search_id,
            search_type: SEARCH_TYPE_AB_TESTING.to_string(),
            total_results: ab_testing_groups.len() + normal_results.len(),
            ab_testing_groups,
            normal_results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(id: i64, weight: i64) -> AbTestingVariant {
        AbTestingVariant {
            config_id: id,
            name: "v1.0.collect.organic".into(),
            weight,
            ui_flow: vec!["otp".into()],
            differences: vec![],
        }
    }

    #[test]
    fn test_group_weights_and_shares() {
        let mut group = AbTestingGroup::new(variant(9054, 1));
        group.push(variant(9101, 3));

        assert_eq!(group.group_name, "v1.0.collect.organic");
        assert_eq!(group.total_weight, 4);
        assert_eq!(group.traffic_share(9054), 0.25);
        assert_eq!(group.traffic_share(9101), 0.75);
        assert_eq!(group.traffic_share(1), 0.0);
        assert_eq!(group.variant_ids(), vec![9054, 9101]);
    }

    #[test]
    fn test_total_weight_saturates() {
        let mut group = AbTestingGroup::new(variant(1, i64::MAX));
        group.push(variant(2, 1));

        assert_eq!(group.total_weight, i64::MAX);
        assert_eq!(group.traffic_share(1), 1.0);
        assert!(group.traffic_share(2) > 0.0);
    }

    #[test]
    fn test_analysis_counts_only_normal_results() {
        let related = vec![
            RelatedConfigResult {
                config_id: 1,
                name: "a".into(),
                flow_type: "unknown".into(),
                ui_version: "v1".into(),
                weight: 1,
                match_reason: "same product_code".into(),
                matched_tags: vec![],
                is_ab_testing: false,
                ab_testing_group: String::new(),
                ab_variants: vec![],
            },
            RelatedConfigResult {
                config_id: 2,
                name: "b".into(),
                flow_type: "unknown".into(),
                ui_version: "v1".into(),
                weight: 1,
                match_reason: "A/B Testing variant".into(),
                matched_tags: vec![],
                is_ab_testing: true,
                ab_testing_group: "A/B Test: b".into(),
                ab_variants: vec![2],
            },
        ];

        let analysis = AbTestingAnalysis::new(9054, vec![], &related);
        assert_eq!(analysis.search_type, "ab_testing_analysis");
        assert_eq!(analysis.normal_results.len(), 1);
        assert_eq!(analysis.total_results, 1);
    }
}
