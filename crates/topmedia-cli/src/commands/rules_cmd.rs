//! `topmedia rules`: print the effective rules document.

use crate::commands::load_rules;
use crate::output::{self, Styled};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use topmedia::Rules;

#[derive(Debug, Clone, Args)]
pub struct RulesArgs {
    /// Rules document replacing the built-in one
    #[arg(long, env = "TOPMEDIA_RULES")]
    pub rules: Option<PathBuf>,
}

/// Run the rules command. The document always goes to stdout so it can be
/// redirected into a file and edited.
pub fn run(args: &RulesArgs) -> Result<()> {
    let rules = load_rules(args.rules.as_deref())?;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&rules)?);
        return Ok(());
    }

    println!("{}", rules.to_json_pretty()?);
    if output::is_verbose() {
        print_counts(&Styled::new(), &rules);
    }
    Ok(())
}

fn print_counts(s: &Styled, rules: &Rules) {
    eprintln!();
    output::print_section(s, "Rules");
    let source = if rules == Rules::embedded() { "built-in" } else { "custom" };
    output::print_check(s.info_sym(), "Source", source);
    output::print_check(s.info_sym(), "Vertical rules", &rules.vertical_rules.len().to_string());
    output::print_check(s.info_sym(), "Region tokens", &rules.region_tokens.len().to_string());
    output::print_check(
        s.info_sym(),
        "Path-locale domains",
        &rules.path_locale_domains.len().to_string(),
    );
    output::print_check(s.info_sym(), "Language codes", &rules.language_codes.len().to_string());
}
