//! UVM Routing - relation matching and journey synthesis for lender configs
//!
//! This crate provides:
//! - `FlowClassifier` - flow-type labels from tags
//! - `is_compatible` - tag matching between a source context and a candidate
//! - Variant detection and A/B group partitioning
//! - `find_related` - related configs and A/B variants of one source
//! - `JourneySynthesizer` - step sequences with resolved UI versions
//! - `Analyzer` - deadline-bounded queries over a `ConfigRepository`

pub mod analyzer;
pub mod classifier;
pub mod journey;
pub mod matcher;
pub mod resolver;
pub mod variant;

pub use analyzer::{Analyzer, CompleteAnalysis, Snapshot};
pub use classifier::FlowClassifier;
pub use journey::{
    condition_for, description_for, transition_label, JourneySynthesizer, TransitionKind,
    NORMAL_LABEL,
};
pub use matcher::{is_compatible, MatchOutcome, MatchSignal, SourceContext};
pub use resolver::{find_related, RelationReport};
pub use variant::{
    are_variants, detect_variants, find_all_groups, find_ui_flow_differences, group_for,
    has_same_critical_tags, CRITICAL_TAGS,
};
