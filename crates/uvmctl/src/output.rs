//! Terminal and file output for uvmctl
//!
//! Structured formats (json, yaml) go to stdout untouched; tables and progress
//! lines are colored only when stdout is a terminal.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use serde::Serialize;

/// Whether stdout is an interactive terminal
pub fn use_colors() -> bool {
    atty::is(atty::Stream::Stdout)
}

/// Print `value` as json or yaml; `Ok(false)` when `format` is neither
pub fn print_structured<T: Serialize>(value: &T, format: &str) -> Result<bool> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(true)
        }
        "yaml" => {
            print!("{}", serde_yaml::to_string(value)?);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Table with the shared look of every uvmctl listing
pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(|h| Cell::new(h)));
    table
}

/// Cell colored with `color` on terminals, plain otherwise
pub fn cell(text: impl ToString, color: Color) -> Cell {
    let cell = Cell::new(text.to_string());
    if use_colors() {
        cell.fg(color)
    } else {
        cell
    }
}

/// Traffic share as a percentage with one decimal
pub fn percent(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

/// Write `contents` to `path`, creating parent directories
pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Serialize `value` as pretty JSON into `path`
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_file(path, &json)
}

/// Progress lines for commands that write files
pub struct Progress {
    use_colors: bool,
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    pub fn new() -> Self {
        Self {
            use_colors: use_colors(),
        }
    }

    pub fn section(&self, title: &str) {
        if self.use_colors {
            println!("{}", format!("=== {} ===", title).bold().cyan());
        } else {
            println!("=== {} ===", title);
        }
    }

    pub fn info(&self, message: &str) {
        println!("  {}", message);
    }

    pub fn written(&self, path: &Path) {
        if self.use_colors {
            println!("  {} {}", "✓".green(), path.display());
        } else {
            println!("  ✓ {}", path.display());
        }
    }

    pub fn done(&self, message: &str) {
        if self.use_colors {
            println!("\n{}", message.bold().green());
        } else {
            println!("\n{}", message);
        }
    }
}
