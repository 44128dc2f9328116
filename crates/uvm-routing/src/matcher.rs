//! Tag matcher - decides whether a candidate config is reachable from a source
//!
//! Matching runs against a `SourceContext`, the single-valued view of the
//! source's tags. Product code and lead source gate the match; telco code and
//! flow type only add signals.

use std::collections::BTreeMap;
use std::fmt;

use uvm_core::{tag_names, LenderConfig, Tag};

use crate::classifier::FlowClassifier;

/// Single-valued view of a source config's tags used for matching
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceContext {
    name: String,
    tags: BTreeMap<String, String>,
}

impl SourceContext {
    /// Later occurrences of a repeated tag override earlier ones; empty values
    /// count as absent.
    pub fn from_config(source: &LenderConfig) -> Self {
        let mut tags = BTreeMap::new();
        for tag in source.tags.iter() {
            tags.insert(tag.name.clone(), tag.value.clone());
        }
        tags.retain(|_, value| !value.is_empty());

        Self {
            name: source.name.clone(),
            tags,
        }
    }

    /// Substitute the lead source; `None` or an empty override keeps the source's own
    pub fn with_lead_source(mut self, lead_source: Option<&str>) -> Self {
        if let Some(lead_source) = lead_source.filter(|ls| !ls.is_empty()) {
            self.tags
                .insert(tag_names::LEAD_SOURCE.to_string(), lead_source.to_string());
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    /// Flow type of the context, empty when neither flow-type tag is set
    pub fn flow_type(&self) -> &str {
        self.get(tag_names::ESIGN_FLOW_TYPE)
            .or_else(|| self.get(tag_names::FLOW_TYPE))
            .unwrap_or(FlowClassifier::CONTEXT_FALLBACK)
    }
}

/// One reason a candidate matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSignal {
    SameProductCode,
    SameLeadSource,
    SharedTelcoCode(String),
    SameFlowType,
    DifferentFlowType(String),
}

impl fmt::Display for MatchSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SameProductCode => write!(f, "same product_code"),
            Self::SameLeadSource => write!(f, "same lead_source"),
            Self::SharedTelcoCode(code) => write!(f, "shared telco_code: {}", code),
            Self::SameFlowType => write!(f, "same flow_type"),
            Self::DifferentFlowType(flow_type) => write!(f, "different flow_type: {}", flow_type),
        }
    }
}

/// Result of matching one candidate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    pub compatible: bool,

    /// Signals in evaluation order
    pub signals: Vec<MatchSignal>,

    pub matched_tags: Vec<Tag>,
}

impl MatchOutcome {
    fn rejected() -> Self {
        Self::default()
    }

    fn record(&mut self, signal: MatchSignal, tag: Tag) {
        self.signals.push(signal);
        self.matched_tags.push(tag);
    }

    /// Signals joined by `", "`
    pub fn reason(&self) -> String {
        self.signals
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Check whether `candidate` is related to the source described by `context`
pub fn is_compatible(candidate: &LenderConfig, context: &SourceContext) -> MatchOutcome {
    if candidate.name == context.name() {
        return MatchOutcome::rejected();
    }

    let mut outcome = MatchOutcome::default();

    // Product code gates when the source has one
    if let Some(product_code) = context.get(tag_names::PRODUCT_CODE) {
        if candidate.tags.single(tag_names::PRODUCT_CODE) != Some(product_code) {
            return MatchOutcome::rejected();
        }
        outcome.record(
            MatchSignal::SameProductCode,
            Tag::new(tag_names::PRODUCT_CODE, product_code),
        );
    }

    // Lead source gates when the source has one
    if let Some(lead_source) = context.get(tag_names::LEAD_SOURCE) {
        if !candidate.tags.contains(tag_names::LEAD_SOURCE, lead_source) {
            return MatchOutcome::rejected();
        }
        outcome.record(
            MatchSignal::SameLeadSource,
            Tag::new(tag_names::LEAD_SOURCE, lead_source),
        );
    }

    if let Some(telco_code) = context.get(tag_names::TELCO_CODE) {
        if candidate.tags.contains(tag_names::TELCO_CODE, telco_code) {
            outcome.record(
                MatchSignal::SharedTelcoCode(telco_code.to_string()),
                Tag::new(tag_names::TELCO_CODE, telco_code),
            );
        }
    }

    let source_flow = context.flow_type();
    let candidate_flow = FlowClassifier::classify_config(candidate);
    if !source_flow.is_empty() && !candidate_flow.is_empty() {
        let signal = if candidate_flow == source_flow {
            MatchSignal::SameFlowType
        } else {
            MatchSignal::DifferentFlowType(candidate_flow.clone())
        };
        outcome.record(signal, Tag::new(tag_names::FLOW_TYPE, candidate_flow));
    }

    outcome.compatible = !outcome.signals.is_empty();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> LenderConfig {
        LenderConfig::new(9054, "v1.0.collect.organic").with_tags([
            ("lead_source", "organic"),
            ("product_code", "P1"),
            ("telco_code", "VT"),
            ("flow_type", "normal"),
        ])
    }

    #[test]
    fn test_full_match_reason_order() {
        let candidate = LenderConfig::new(9095, "v1.0.auto_pcb").with_tags([
            ("flow_type", "auto_pcb"),
            ("telco_code", "MB"),
            ("telco_code", "VT"),
            ("lead_source", "organic"),
            ("product_code", "P1"),
        ]);

        let outcome = is_compatible(&candidate, &SourceContext::from_config(&source()));
        assert!(outcome.compatible);
        assert_eq!(
            outcome.reason(),
            "same product_code, same lead_source, shared telco_code: VT, different flow_type: auto_pcb"
        );
        assert_eq!(outcome.matched_tags.len(), 4);
        assert_eq!(outcome.matched_tags[3], Tag::new("flow_type", "auto_pcb"));
    }

    #[test]
    fn test_same_name_never_compatible() {
        let twin = source().with_ui_flow(["otp"]);
        let outcome = is_compatible(&twin, &SourceContext::from_config(&source()));
        assert!(!outcome.compatible);
        assert!(outcome.signals.is_empty());
    }

    #[test]
    fn test_product_code_gates() {
        let candidate = LenderConfig::new(2, "other")
            .with_tags([("product_code", "P2"), ("lead_source", "organic")]);
        assert!(!is_compatible(&candidate, &SourceContext::from_config(&source())).compatible);
    }

    #[test]
    fn test_different_telco_code_still_compatible() {
        let candidate = LenderConfig::new(9095, "v1.0.auto_pcb").with_tags([
            ("product_code", "P1"),
            ("lead_source", "organic"),
            ("telco_code", "MB"),
            ("flow_type", "auto_pcb"),
        ]);

        let outcome = is_compatible(&candidate, &SourceContext::from_config(&source()));
        assert!(outcome.compatible);
        assert_eq!(
            outcome.reason(),
            "same product_code, same lead_source, different flow_type: auto_pcb"
        );
    }

    #[test]
    fn test_lead_source_override() {
        let candidate = LenderConfig::new(2, "paid.flow")
            .with_tags([("product_code", "P1"), ("lead_source", "paid")]);

        let context = SourceContext::from_config(&source());
        assert!(!is_compatible(&candidate, &context).compatible);

        let overridden = context.with_lead_source(Some("paid"));
        let outcome = is_compatible(&candidate, &overridden);
        assert!(outcome.compatible);
        // Candidate has no flow type tag
        assert_eq!(
            outcome.reason(),
            "same product_code, same lead_source, different flow_type: unknown"
        );
    }

    #[test]
    fn test_context_last_occurrence_and_empty_values() {
        let source = LenderConfig::new(1, "src").with_tags([
            ("lead_source", "paid"),
            ("lead_source", "organic"),
            ("product_code", ""),
        ]);
        let context = SourceContext::from_config(&source);
        assert_eq!(context.get("lead_source"), Some("organic"));
        assert_eq!(context.get("product_code"), None);
        assert_eq!(context.flow_type(), "");

        // No product code and no flow type: only the lead source signal remains
        let candidate = LenderConfig::new(2, "dst").with_tags([("lead_source", "organic")]);
        let outcome = is_compatible(&candidate, &context);
        assert!(outcome.compatible);
        assert_eq!(outcome.reason(), "same lead_source");
    }

    #[test]
    fn test_no_signals_is_incompatible() {
        let source = LenderConfig::new(1, "src");
        let candidate = LenderConfig::new(2, "dst").with_tags([("product_code", "P1")]);
        let outcome = is_compatible(&candidate, &SourceContext::from_config(&source));
        assert!(!outcome.compatible);
    }
}
