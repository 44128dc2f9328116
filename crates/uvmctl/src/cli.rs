use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use uvm_core::{DirectoryRepository, JourneyRules};
use uvm_routing::Analyzer;

use crate::commands;

/// UVM CLI - UI version mapping for lender-onboarding configs
#[derive(Parser, Debug)]
#[command(name = "uvmctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding lender config JSON documents
    #[arg(long, global = true, env = "UVM_CONFIG_ROOT", default_value = "vendor/configs")]
    pub config_root: PathBuf,

    /// Directory analysis files are written to
    #[arg(long, global = true, env = "UVM_OUTPUT_DIR", default_value = "out/test_results")]
    pub output_dir: PathBuf,

    /// YAML file replacing the built-in journey rules
    #[arg(long, global = true, env = "UVM_RULES")]
    pub rules: Option<PathBuf>,

    /// Deadline for loading configs, in seconds
    #[arg(long, global = true, env = "UVM_TIMEOUT_SECS", default_value_t = 300)]
    pub timeout_secs: u64,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List configs related to a source config (routing targets and A/B variants)
    Related {
        /// Source lender config ID
        id: i64,

        /// Match against this lead source instead of the source's own
        #[arg(long)]
        lead_source: Option<String>,

        /// Sub-directory of the config root to search (default: whole root)
        #[arg(long, default_value = "")]
        scope: String,

        /// Output format (wide, json, yaml)
        #[arg(short, long, default_value = "wide")]
        output: String,
    },

    /// List every A/B testing group in a scope
    AbGroups {
        /// Sub-directory of the config root to search (default: whole root)
        #[arg(long, default_value = "")]
        scope: String,

        /// Output format (wide, json, yaml)
        #[arg(short, long, default_value = "wide")]
        output: String,
    },

    /// Show the journeys from a source config with resolved UI versions
    Journey {
        /// Source lender config ID
        id: i64,

        /// Match against this lead source instead of the source's own
        #[arg(long)]
        lead_source: Option<String>,

        /// Sub-directory of the config root to search (default: whole root)
        #[arg(long, default_value = "")]
        scope: String,

        /// Output format (text, json, yaml)
        #[arg(short, long, default_value = "text")]
        output: String,
    },

    /// Run an analysis and write result files under the output directory
    Analyze {
        /// Source lender config ID
        id: i64,

        /// Match against this lead source instead of the source's own
        #[arg(long)]
        lead_source: Option<String>,

        /// Sub-directory of the config root to search (default: whole root)
        #[arg(long, default_value = "")]
        scope: String,

        /// Which documents to produce
        #[arg(long, value_enum, default_value = "complete")]
        mode: commands::analyze::Mode,
    },

    /// Print the effective journey rules
    Rules {
        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        output: String,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: commands::completion::Shell,
    },
}

impl Cli {
    pub async fn execute(self) -> anyhow::Result<()> {
        if let Commands::Completion { shell } = self.command {
            return commands::completion::execute(shell);
        }

        let rules = self.load_rules()?;
        let analyzer = Analyzer::new(DirectoryRepository::new(&self.config_root))
            .with_rules(rules)
            .with_deadline(Duration::from_secs(self.timeout_secs));

        match self.command {
            Commands::Related {
                id,
                lead_source,
                scope,
                output,
            } => {
                commands::related::execute(&analyzer, id, lead_source.as_deref(), &scope, &output)
                    .await
            }
            Commands::AbGroups { scope, output } => {
                commands::ab_groups::execute(&analyzer, &scope, &output).await
            }
            Commands::Journey {
                id,
                lead_source,
                scope,
                output,
            } => {
                commands::journey::execute(&analyzer, id, lead_source.as_deref(), &scope, &output)
                    .await
            }
            Commands::Analyze {
                id,
                lead_source,
                scope,
                mode,
            } => {
                commands::analyze::execute(
                    &analyzer,
                    id,
                    lead_source.as_deref(),
                    &scope,
                    mode,
                    &self.output_dir,
                )
                .await
            }
            Commands::Rules { output } => {
                commands::rules::execute(analyzer.synthesizer().rules(), &output)
            }
            Commands::Completion { .. } => Ok(()),
        }
    }

    fn load_rules(&self) -> anyhow::Result<JourneyRules> {
        match &self.rules {
            Some(path) => JourneyRules::from_yaml_file(path)
                .with_context(|| format!("Failed to load journey rules from {}", path.display())),
            None => Ok(JourneyRules::default()),
        }
    }
}
