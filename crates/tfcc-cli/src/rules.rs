//! # `tfcc rules`
//!
//! Inspect a rule catalog.
//!
//! ```bash
//! tfcc rules validate rules/
//! tfcc rules list rules/
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::catalog::RuleCatalog;
use crate::config::Config;

/// Rules subcommand arguments.
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

/// Available rules subcommands.
#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    /// Check every rule document under a catalog directory.
    /// Exits 1 if any document is invalid.
    Validate {
        /// Catalog root. Falls back to `rules_dir` in the config file.
        dir: Option<PathBuf>,
    },

    /// List the valid rules of a catalog.
    List {
        /// Catalog root. Falls back to `rules_dir` in the config file.
        dir: Option<PathBuf>,
    },
}

/// Execute the rules subcommand.
pub fn run_rules(args: &RulesArgs, config: &Config) -> Result<u8> {
    match &args.command {
        RulesCommand::Validate { dir } => {
            let catalog = RuleCatalog::load(&config.rules_dir(dir.as_deref())?)?;
            Ok(report_problems(&catalog))
        }
        RulesCommand::List { dir } => {
            let catalog = RuleCatalog::load(&config.rules_dir(dir.as_deref())?)?;
            for entry in catalog.entries() {
                println!(
                    "  {:<48} {:<28} {}",
                    entry.key.to_string(),
                    entry.rule.resource_type,
                    entry.rule.compliance_level
                );
            }
            println!();
            println!("Total: {} rules", catalog.entries().len());
            Ok(0)
        }
    }
}

fn report_problems(catalog: &RuleCatalog) -> u8 {
    for problem in catalog.problems() {
        println!("INVALID {}", problem.path);
        for message in &problem.messages {
            println!("  - {message}");
        }
    }
    println!(
        "{} valid, {} invalid",
        catalog.entries().len(),
        catalog.problems().len()
    );
    if catalog.problems().is_empty() {
        0
    } else {
        1
    }
}
