//! Variant detector - finds configs that are A/B testing variants of each other
//!
//! Two configs are variants when they share a name and their critical tags,
//! carry different UI flows and both receive traffic.

use std::collections::HashSet;

use uvm_core::{tag_names, AbTestingGroup, AbTestingVariant, LenderConfig, ORIGINAL_VARIANT};

use crate::classifier::FlowClassifier;

/// Tags that must agree between variants, compared as multisets
pub const CRITICAL_TAGS: [&str; 5] = [
    tag_names::PRODUCT_CODE,
    tag_names::LEAD_SOURCE,
    tag_names::TELCO_CODE,
    tag_names::FLOW_TYPE,
    tag_names::ESIGN_FLOW_TYPE,
];

/// Symmetric A/B variant check
pub fn are_variants(a: &LenderConfig, b: &LenderConfig) -> bool {
    a.name == b.name
        && has_same_critical_tags(a, b)
        && a.ui_flow != b.ui_flow
        && a.weight > 0
        && b.weight > 0
}

/// Critical tags agree as multisets. A mismatch on a flow-type tag is
/// tolerated when both configs still classify to the same flow type.
pub fn has_same_critical_tags(a: &LenderConfig, b: &LenderConfig) -> bool {
    CRITICAL_TAGS.iter().all(|name| {
        if a.tags.same_values(&b.tags, name) {
            return true;
        }
        match *name {
            tag_names::FLOW_TYPE | tag_names::ESIGN_FLOW_TYPE => {
                FlowClassifier::classify(&a.tags) == FlowClassifier::classify(&b.tags)
            }
            _ => false,
        }
    })
}

/// Position-by-position differences from `a` (original) to `b` (variant)
pub fn find_ui_flow_differences(a: &[String], b: &[String]) -> Vec<String> {
    let len = a.len().max(b.len());
    let mut differences = Vec::new();

    for i in 0..len {
        match (a.get(i), b.get(i)) {
            (Some(left), Some(right)) if left != right => {
                differences.push(format!("step {}: {} vs {}", i, left, right));
            }
            (Some(left), None) => {
                differences.push(format!("step {}: {} (missing in variant)", i, left));
            }
            (None, Some(right)) => {
                differences.push(format!("step {}: {} (extra in variant)", i, right));
            }
            _ => {}
        }
    }

    differences
}

fn to_variant(config: &LenderConfig, differences: Vec<String>) -> AbTestingVariant {
    AbTestingVariant {
        config_id: config.id,
        name: config.name.clone(),
        weight: config.weight,
        ui_flow: config.ui_flow.clone(),
        differences,
    }
}

/// Every variant of `source` in `corpus`, with its differences against the source
pub fn detect_variants(source: &LenderConfig, corpus: &[LenderConfig]) -> Vec<AbTestingVariant> {
    corpus
        .iter()
        .filter(|config| config.id != source.id && are_variants(source, config))
        .map(|config| to_variant(config, find_ui_flow_differences(&source.ui_flow, &config.ui_flow)))
        .collect()
}

/// Group headed by `source`, or `None` when the source has no variants
pub fn group_for(source: &LenderConfig, variants: &[AbTestingVariant]) -> Option<AbTestingGroup> {
    if variants.is_empty() {
        return None;
    }

    let mut group = AbTestingGroup::new(to_variant(source, vec![ORIGINAL_VARIANT.to_string()]));
    for variant in variants {
        group.push(variant.clone());
    }
    Some(group)
}

/// Partition a corpus into A/B groups. The first member of a group in
/// traversal order is its original variant; no config joins two groups.
pub fn find_all_groups(corpus: &[LenderConfig]) -> Vec<AbTestingGroup> {
    let mut groups = Vec::new();
    let mut processed: HashSet<i64> = HashSet::new();

    for config in corpus {
        if processed.contains(&config.id) {
            continue;
        }

        let variants: Vec<AbTestingVariant> = detect_variants(config, corpus)
            .into_iter()
            .filter(|v| !processed.contains(&v.config_id))
            .collect();

        if let Some(group) = group_for(config, &variants) {
            processed.extend(group.variant_ids());
            tracing::debug!(
                "A/B group '{}' with {} variants",
                group.group_name,
                group.variants.len()
            );
            groups.push(group);
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(steps: &[&str]) -> Vec<String> {
        steps.iter().map(|s| s.to_string()).collect()
    }

    fn organic(id: i64, steps: &[&str], weight: i64) -> LenderConfig {
        LenderConfig::new(id, "v1.0.collect.organic")
            .with_tags([
                ("lead_source", "organic"),
                ("product_code", "P1"),
                ("telco_code", "VT"),
                ("telco_code", "MB"),
            ])
            .with_ui_flow(steps.iter().copied())
            .with_weight(weight)
    }

    #[test]
    fn test_differences() {
        let a = flow(&["otp", "app_form.basic_info", "ekyc.selfie.active"]);
        let b = flow(&["otp", "ekyc.selfie.active"]);

        assert_eq!(
            find_ui_flow_differences(&a, &b),
            vec![
                "step 1: app_form.basic_info vs ekyc.selfie.active",
                "step 2: ekyc.selfie.active (missing in variant)",
            ]
        );
        assert_eq!(
            find_ui_flow_differences(&b, &a)[1],
            "step 2: ekyc.selfie.active (extra in variant)"
        );
        assert!(find_ui_flow_differences(&a, &a).is_empty());
    }

    #[test]
    fn test_variants_symmetric() {
        let a = organic(9054, &["otp", "app_form.basic_info"], 1);
        let b = organic(9101, &["otp", "ekyc.selfie.active"], 1);
        assert!(are_variants(&a, &b));
        assert!(are_variants(&b, &a));
    }

    #[test]
    fn test_identical_flow_or_zero_weight_not_variants() {
        let a = organic(1, &["otp"], 1);
        assert!(!are_variants(&a, &organic(2, &["otp"], 1)));
        assert!(!are_variants(&a, &organic(3, &["failure"], 0)));
    }

    #[test]
    fn test_telco_order_independent() {
        let a = organic(1, &["otp"], 1);
        let b = LenderConfig::new(2, "v1.0.collect.organic")
            .with_tags([
                ("telco_code", "MB"),
                ("product_code", "P1"),
                ("telco_code", "VT"),
                ("lead_source", "organic"),
            ])
            .with_ui_flow(["failure"])
            .with_weight(1);
        assert!(are_variants(&a, &b));
    }

    #[test]
    fn test_esign_flow_type_equivalent_to_flow_type() {
        let a = LenderConfig::new(1, "n")
            .with_tags([("flow_type", "auto_pcb")])
            .with_ui_flow(["otp"])
            .with_weight(1);
        let b = LenderConfig::new(2, "n")
            .with_tags([("esign_flow_type", "auto_pcb")])
            .with_ui_flow(["failure"])
            .with_weight(1);
        let c = LenderConfig::new(3, "n")
            .with_tags([("esign_flow_type", "semi")])
            .with_ui_flow(["failure"])
            .with_weight(1);

        assert!(has_same_critical_tags(&a, &b));
        assert!(!has_same_critical_tags(&a, &c));
    }

    #[test]
    fn test_find_all_groups_partitions() {
        let corpus = vec![
            organic(9054, &["otp", "a"], 1),
            organic(9101, &["otp", "b"], 1),
            organic(9102, &["otp", "c"], 2),
            LenderConfig::new(9095, "v1.0.auto_pcb").with_weight(1),
        ];

        let groups = find_all_groups(&corpus);
        assert_eq!(groups.len(), 1);

        let group = &groups[0];
        assert_eq!(group.variant_ids(), vec![9054, 9101, 9102]);
        assert_eq!(group.total_weight, 4);
        assert_eq!(group.variants[0].differences, vec![ORIGINAL_VARIANT]);
        assert_eq!(group.variants[1].differences, vec!["step 1: a vs b"]);
    }

    #[test]
    fn test_find_all_groups_with_huge_weights() {
        let corpus = vec![
            organic(1, &["otp", "a"], i64::MAX),
            organic(2, &["otp", "b"], 1),
        ];

        let groups = find_all_groups(&corpus);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].variant_ids(), vec![1, 2]);
        assert_eq!(groups[0].total_weight, i64::MAX);
    }

    #[test]
    fn test_group_for_without_variants() {
        assert!(group_for(&organic(1, &["otp"], 1), &[]).is_none());
    }
}
