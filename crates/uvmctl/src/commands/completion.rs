//! Shell completion generation for uvmctl
//!
//! Commands:
//! - uvmctl completion bash  > /etc/bash_completion.d/uvmctl
//! - uvmctl completion zsh   > ~/.zsh/completion/_uvmctl
//! - uvmctl completion fish  > ~/.config/fish/completions/uvmctl.fish

use anyhow::Result;
use clap::{CommandFactory, ValueEnum};
use clap_complete::{generate, Shell as ClapShell};
use std::io;

use crate::cli::Cli;

/// Supported shells for completion
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
    Elvish,
}

impl From<Shell> for ClapShell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => ClapShell::Bash,
            Shell::Zsh => ClapShell::Zsh,
            Shell::Fish => ClapShell::Fish,
            Shell::Powershell => ClapShell::PowerShell,
            Shell::Elvish => ClapShell::Elvish,
        }
    }
}

/// Write the completion script to stdout, install hints to stderr
pub fn execute(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(ClapShell::from(shell), &mut cmd, name, &mut io::stdout());

    let hint = match shell {
        Shell::Bash => "uvmctl completion bash > /etc/bash_completion.d/uvmctl\n#    or: source <(uvmctl completion bash)",
        Shell::Zsh => "uvmctl completion zsh > ~/.zsh/completion/_uvmctl\n#    then run 'compinit'",
        Shell::Fish => "uvmctl completion fish > ~/.config/fish/completions/uvmctl.fish",
        Shell::Powershell => "uvmctl completion powershell > uvmctl.ps1\n#    then: . ./uvmctl.ps1",
        Shell::Elvish => "uvmctl completion elvish > ~/.elvish/lib/uvmctl.elv",
    };
    eprintln!();
    eprintln!("# Installation:");
    eprintln!("#    {}", hint);

    Ok(())
}
