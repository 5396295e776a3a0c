//! # tfcc CLI entry point
//!
//! Parses command-line arguments, loads the config file and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tfcc_cli::check::{run_check, CheckArgs};
use tfcc_cli::config::Config;
use tfcc_cli::report::{run_report, ReportArgs};
use tfcc_cli::rules::{run_rules, RulesArgs};
use tfcc_cli::run::{run_run, RunArgs};

/// Terraform state compliance checker.
///
/// Applies declarative rules to the resources recorded in Terraform state
/// files and folds the verdicts into per-workspace, per-entity and per-run
/// compliance reports.
#[derive(Parser, Debug)]
#[command(name = "tfcc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Exit with code 2 when the result is non-compliant.
    #[arg(long, global = true)]
    fail_on_non_compliant: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate one state file and write per-rule verdict lists.
    Check(CheckArgs),

    /// Fold a results directory into a compliance report.
    Report(ReportArgs),

    /// Check every workspace of a manifest and build the report.
    Run(RunArgs),

    /// Validate or list a rule catalog.
    Rules(RulesArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = Config::load(cli.config.as_deref()).and_then(|mut config| {
        config.fail_on_non_compliant |= cli.fail_on_non_compliant;
        match &cli.command {
            Commands::Check(args) => run_check(args, &config),
            Commands::Report(args) => run_report(args, &config),
            Commands::Run(args) => run_run(args, &config),
            Commands::Rules(args) => run_rules(args, &config),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
