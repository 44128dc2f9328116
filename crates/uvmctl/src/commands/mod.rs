pub mod ab_groups;
pub mod analyze;
pub mod completion;
pub mod journey;
pub mod related;
pub mod rules;
