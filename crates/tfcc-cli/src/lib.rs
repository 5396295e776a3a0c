//! # tfcc-cli — Compliance Checker Command-Line Interface
//!
//! Wires the engine crates to local files. The engine itself never touches
//! the filesystem; everything here reads inputs, hands them to the engine
//! and writes the outputs.
//!
//! ## Subcommands
//!
//! - `tfcc check`: evaluate one state file against the rule catalog and
//!   write per-rule verdict lists.
//! - `tfcc report`: fold a results directory into a compliance report.
//! - `tfcc run`: full pipeline over a workspace manifest.
//! - `tfcc rules validate` / `tfcc rules list`: inspect a rule catalog.
//!
//! ```bash
//! tfcc check --state platform-api.tfstate --rules rules/ --entity platform --environment prod
//! tfcc report --results out/2024-03-01-08-30-00 --format markdown
//! tfcc run --manifest workspaces.yaml --out report.md --format markdown
//! tfcc rules validate rules/
//! ```
//!
//! ## Exit Codes
//!
//! `0` success, `1` error, `2` non-compliant result with
//! `--fail-on-non-compliant` (or `fail_on_non_compliant: true` in the
//! config file).

pub mod catalog;
pub mod check;
pub mod config;
pub mod report;
pub mod rules;
pub mod run;

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

/// Exit code for a completed run whose result is non-compliant, when the
/// caller asked for it to fail.
pub const EXIT_NON_COMPLIANT: u8 = 2;

/// Output format of a compliance report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

/// Render a report in the requested format.
pub fn render_report(
    report: &tfcc_report::ComplianceReport,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => report.to_json_pretty().context("serializing compliance report"),
        OutputFormat::Markdown => Ok(tfcc_report::render_markdown(report)),
    }
}

/// Write `content` to `out`, creating parent directories, or to stdout
/// when no path is given.
pub fn write_output(out: Option<&Path>, content: &str) -> Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directory: {}", parent.display()))?;
            }
            std::fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => println!("{content}"),
    }
    Ok(())
}

/// Exit code for a finished command.
pub fn outcome_code(compliant: bool, fail_on_non_compliant: bool) -> u8 {
    if !compliant && fail_on_non_compliant {
        EXIT_NON_COMPLIANT
    } else {
        0
    }
}
