//! # `tfcc report`
//!
//! Folds a results directory laid out as
//! `<dir>/<entity>/<workspace>/results.json` into a compliance report.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use tfcc_core::RunTimestamp;
use tfcc_report::{decode_verdicts, fold_workspace, ComplianceReport, ReportBuilder, ResultKey};

use crate::catalog::discover_json_files;
use crate::config::Config;
use crate::{outcome_code, render_report, write_output, OutputFormat};

/// Arguments for `tfcc report`.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Results directory of one run.
    #[arg(long)]
    pub results: PathBuf,

    /// Run timestamp (`YYYY-MM-DD-HH-MM-SS` or RFC 3339 UTC). Defaults to the
    /// results directory name when it parses as one, else the current time.
    #[arg(long)]
    pub timestamp: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write the report here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Execute `tfcc report`.
pub fn run_report(args: &ReportArgs, config: &Config) -> Result<u8> {
    let timestamp = resolve_timestamp(args.timestamp.as_deref(), &args.results)?;
    let report = load_results(&args.results, timestamp)?;
    write_output(args.out.as_deref(), &render_report(&report, args.format)?)?;
    Ok(outcome_code(report.is_compliant(), config.fail_on_non_compliant))
}

/// Read every results file below `root` and fold them into one report.
pub fn load_results(root: &Path, timestamp: RunTimestamp) -> Result<ComplianceReport> {
    let mut builder = ReportBuilder::new(timestamp);
    for relative in discover_json_files(root)? {
        let key = match ResultKey::parse(&relative) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(
                    path = %relative,
                    error = %e,
                    "skipping file outside the results layout"
                );
                continue;
            }
        };
        let path = key.path_in(root);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading results file: {}", path.display()))?;
        let verdicts = decode_verdicts(&content).with_context(|| {
            format!("decoding results for workspace {}/{}", key.entity, key.workspace)
        })?;
        tracing::debug!(
            entity = %key.entity,
            workspace = %key.workspace,
            verdicts = verdicts.len(),
            "loaded results"
        );
        builder
            .add_workspace(&key.entity, key.workspace.clone(), fold_workspace(verdicts))
            .with_context(|| format!("adding workspace {}/{}", key.entity, key.workspace))?;
    }
    Ok(builder.build())
}

fn resolve_timestamp(explicit: Option<&str>, results: &Path) -> Result<RunTimestamp> {
    if let Some(raw) = explicit {
        return RunTimestamp::parse(raw).with_context(|| format!("parsing --timestamp {raw:?}"));
    }
    let from_dir = results
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| RunTimestamp::parse(name).ok());
    Ok(from_dir.unwrap_or_else(RunTimestamp::now))
}
