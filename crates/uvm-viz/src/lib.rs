//! UVM Visualization - diagrams and terminal output for UI version mapping
//!
//! This crate provides:
//! - PlantUML source for A/B groups, journey overviews and per-journey steps
//! - ASCII/Unicode rendering of journeys for the terminal

mod journey;
mod plantuml;

pub use journey::{resolution_marker, JourneyRenderer};
pub use plantuml::{label_color, sanitize_filename, PlantUmlRenderer};

/// Render configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Maximum width for output
    pub max_width: usize,
    /// Use Unicode box drawing characters
    pub use_unicode: bool,
    /// Use ANSI colors (terminal only)
    pub use_colors: bool,
    /// Compact mode (fewer lines)
    pub compact: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_width: 80,
            use_unicode: true,
            use_colors: false, // Safe when piped into files
            compact: false,
        }
    }
}

impl RenderConfig {
    /// Configuration for interactive terminals
    pub fn terminal() -> Self {
        Self {
            use_colors: true,
            ..Self::default()
        }
    }

    /// One line per step, no branches
    pub fn compact() -> Self {
        Self {
            max_width: 40,
            use_unicode: true,
            use_colors: false,
            compact: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_config_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.max_width, 80);
        assert!(config.use_unicode);
        assert!(!config.use_colors);
        assert!(!config.compact);
    }

    #[test]
    fn test_render_config_terminal() {
        let config = RenderConfig::terminal();
        assert_eq!(config.max_width, 80);
        assert!(config.use_colors);
    }

    #[test]
    fn test_render_config_compact() {
        let config = RenderConfig::compact();
        assert_eq!(config.max_width, 40);
        assert!(!config.use_colors);
        assert!(config.compact);
    }
}
