// UVM Core - Foundation types for UI version mapping
//
// This crate provides the lender config data model, the analysis result
// documents, config repositories and the journey rule tables shared by the
// routing engine, renderers and the CLI.

pub mod analysis;
pub mod config;
pub mod error;
pub mod journey;
pub mod registry;
pub mod rules;

// Re-export core types
pub use analysis::{
    AbTestingAnalysis, AbTestingGroup, AbTestingVariant, RelatedConfigResult, ORIGINAL_VARIANT,
    SEARCH_TYPE_AB_TESTING,
};
pub use config::{tag_names, LenderConfig, Tag, TagSet};
pub use error::{UvmError, UvmResult};
pub use journey::{
    Journey, JourneyTemplate, Resolution, Step, SubUiVersionByCondition,
    SEARCH_TYPE_LENDER_CONFIG,
};
pub use registry::{
    load_json_file, scan_json_files, ConfigRepository, DirectoryRepository, InMemoryRepository,
};
pub use rules::{ConditionalRule, JourneyRules, ResolvedOverride, StepOverride};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
