use anyhow::Result;
use uvm_core::JourneyRules;

use crate::output;

/// Print the journey rules in effect (built-in or loaded with --rules)
pub fn execute(rules: &JourneyRules, output: &str) -> Result<()> {
    if !output::print_structured(rules, output)? {
        anyhow::bail!("Unknown output format: {} (expected yaml or json)", output);
    }
    Ok(())
}
