//! Flow classifier - derives a normalized flow-type label from config tags
//!
//! An e-sign specific flow type takes priority over the generic one. Standalone
//! configs without either tag classify as `unknown`; a source context without
//! either classifies as the empty string, which disables flow-type signals.

use uvm_core::{tag_names, LenderConfig, TagSet};

/// Flow type classification
pub struct FlowClassifier;

impl FlowClassifier {
    /// Fallback for a config classified on its own
    pub const STANDALONE_FALLBACK: &'static str = "unknown";

    /// Fallback for a (possibly overridden) source context
    pub const CONTEXT_FALLBACK: &'static str = "";

    /// First `esign_flow_type` value, else first `flow_type` value, else `fallback`
    pub fn classify_with(tags: &TagSet, fallback: &str) -> String {
        tags.first(tag_names::ESIGN_FLOW_TYPE)
            .or_else(|| tags.first(tag_names::FLOW_TYPE))
            .unwrap_or(fallback)
            .to_string()
    }

    /// Classify a standalone tag set
    pub fn classify(tags: &TagSet) -> String {
        Self::classify_with(tags, Self::STANDALONE_FALLBACK)
    }

    pub fn classify_config(config: &LenderConfig) -> String {
        Self::classify(&config.tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_esign_flow_type_has_priority() {
        let tags = TagSet::from_pairs([("flow_type", "normal"), ("esign_flow_type", "auto_pcb")]);
        assert_eq!(FlowClassifier::classify(&tags), "auto_pcb");
    }

    #[test]
    fn test_first_value_wins() {
        let tags = TagSet::from_pairs([("flow_type", "semi"), ("flow_type", "auto_cic")]);
        assert_eq!(FlowClassifier::classify(&tags), "semi");
    }

    #[test]
    fn test_fallbacks() {
        let tags = TagSet::from_pairs([("product_code", "P1")]);
        assert_eq!(FlowClassifier::classify(&tags), "unknown");
        assert_eq!(
            FlowClassifier::classify_with(&tags, FlowClassifier::CONTEXT_FALLBACK),
            ""
        );
    }
}
