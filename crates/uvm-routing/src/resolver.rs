//! Relation resolver - related configs and A/B variants of one source config
//!
//! A/B variants are computed first over the whole corpus and reported as their
//! own category; every other config goes through the tag matcher.

use std::collections::HashSet;

use uvm_core::{AbTestingGroup, LenderConfig, RelatedConfigResult};

use crate::classifier::FlowClassifier;
use crate::matcher::{is_compatible, SourceContext};
use crate::variant::{detect_variants, group_for};

/// Relations of one source config
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationReport {
    /// Group headed by the source, when it has A/B variants
    pub ab_group: Option<AbTestingGroup>,

    /// Routing targets and A/B variants, in corpus traversal order
    pub related: Vec<RelatedConfigResult>,
}

impl RelationReport {
    /// Routing targets only
    pub fn routing_targets(&self) -> impl Iterator<Item = &RelatedConfigResult> {
        self.related.iter().filter(|r| !r.is_ab_testing)
    }

    pub fn ab_variants(&self) -> impl Iterator<Item = &RelatedConfigResult> {
        self.related.iter().filter(|r| r.is_ab_testing)
    }
}

fn base_result(config: &LenderConfig, match_reason: String) -> RelatedConfigResult {
    RelatedConfigResult {
        config_id: config.id,
        name: config.name.clone(),
        flow_type: FlowClassifier::classify_config(config),
        ui_version: config.ui_version.clone(),
        weight: config.weight,
        match_reason,
        matched_tags: Vec::new(),
        is_ab_testing: false,
        ab_testing_group: String::new(),
        ab_variants: Vec::new(),
    }
}

/// Find every config related to `source`.
///
/// `lead_source_override` replaces the source's lead source during matching only.
pub fn find_related(
    source: &LenderConfig,
    lead_source_override: Option<&str>,
    corpus: &[LenderConfig],
) -> RelationReport {
    let variants = detect_variants(source, corpus);
    let variant_ids: Vec<i64> = variants.iter().map(|v| v.config_id).collect();
    let context = SourceContext::from_config(source).with_lead_source(lead_source_override);

    let mut related = Vec::new();
    let mut seen: HashSet<i64> = HashSet::new();

    for config in corpus {
        if config.id == source.id || seen.contains(&config.id) {
            continue;
        }

        if let Some(variant) = variants.iter().find(|v| v.config_id == config.id) {
            let reason = format!(
                "A/B Testing variant (Weight: {}, Differences: {})",
                config.weight,
                variant.differences.join("; ")
            );
            related.push(RelatedConfigResult {
                is_ab_testing: true,
                ab_testing_group: format!("A/B Test: {}", config.name),
                ab_variants: variant_ids.clone(),
                ..base_result(config, reason)
            });
            seen.insert(config.id);
            continue;
        }

        let outcome = is_compatible(config, &context);
        if outcome.compatible {
            related.push(RelatedConfigResult {
                matched_tags: outcome.matched_tags.clone(),
                ..base_result(config, outcome.reason())
            });
            seen.insert(config.id);
        }
    }

    let report = RelationReport {
        ab_group: group_for(source, &variants),
        related,
    };

    tracing::info!(
        "Config {}: {} related, {} A/B variants",
        source.id,
        report.routing_targets().count(),
        report.ab_variants().count()
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn organic(id: i64, name: &str, flow: &[&str]) -> LenderConfig {
        LenderConfig::new(id, name)
            .with_tags([("lead_source", "organic"), ("product_code", "P1")])
            .with_ui_version("v9.1.5.0")
            .with_ui_flow(flow.iter().copied())
            .with_weight(1)
    }

    #[test]
    fn test_variants_reported_separately() {
        let source = organic(9054, "collect", &["otp", "a"]);
        let corpus = vec![
            source.clone(),
            organic(9101, "collect", &["otp", "b"]),
            organic(9200, "rejection", &["failure"]),
        ];

        let report = find_related(&source, None, &corpus);
        assert_eq!(report.related.len(), 2);

        let variant = &report.related[0];
        assert!(variant.is_ab_testing);
        assert_eq!(variant.ab_testing_group, "A/B Test: collect");
        assert_eq!(
            variant.match_reason,
            "A/B Testing variant (Weight: 1, Differences: step 1: a vs b)"
        );
        assert_eq!(variant.ab_variants, vec![9101]);

        let target = &report.related[1];
        assert!(!target.is_ab_testing);
        assert_eq!(target.match_reason, "same product_code, same lead_source");
        assert_eq!(target.flow_type, "unknown");

        let group = report.ab_group.unwrap();
        assert_eq!(group.variant_ids(), vec![9054, 9101]);
    }

    #[test]
    fn test_same_name_non_variant_excluded() {
        let source = organic(1, "collect", &["otp"]);
        // Same name and flow: neither a variant nor a routing target
        let corpus = vec![source.clone(), organic(2, "collect", &["otp"])];

        let report = find_related(&source, None, &corpus);
        assert!(report.related.is_empty());
        assert!(report.ab_group.is_none());
    }

    #[test]
    fn test_duplicate_ids_reported_once() {
        let source = organic(1, "collect", &["otp"]);
        let corpus = vec![
            source.clone(),
            organic(2, "other", &["otp"]),
            organic(2, "other", &["otp"]),
        ];

        let report = find_related(&source, None, &corpus);
        assert_eq!(report.routing_targets().count(), 1);
    }

    #[test]
    fn test_empty_corpus() {
        let source = organic(1, "collect", &["otp"]);
        let report = find_related(&source, Some("paid"), &[]);
        assert!(report.related.is_empty());
    }
}
