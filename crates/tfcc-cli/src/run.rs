//! # `tfcc run`
//!
//! Full pipeline over a workspace manifest: load the rule catalog once,
//! check every workspace's state file in parallel, optionally persist the
//! per-workspace results, and fold everything into one report.
//!
//! ```yaml
//! rules_dir: rules            # optional, overrides the config file
//! workspaces:
//!   - name: platform-api
//!     state: states/platform-api.tfstate
//!     environment: PROD
//!   - name: billing-core
//!     entity: billing
//!     tags: ["team:payments", "environment:dev"]
//!     state: states/billing-core.tfstate
//! ```
//!
//! Relative paths are resolved against the manifest's directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use rayon::prelude::*;
use serde::Deserialize;

use tfcc_core::{RunTimestamp, Verdict};
use tfcc_report::{
    encode_verdicts, fold_workspace, ComplianceReport, ReportBuilder, ResultKey, WorkspaceReport,
};

use crate::catalog::RuleCatalog;
use crate::check::check_state_file;
use crate::config::{resolve_against, Config};
use crate::{outcome_code, render_report, write_output, OutputFormat};

/// Tag prefix carrying a workspace's environment.
pub const ENVIRONMENT_TAG_PREFIX: &str = "environment:";

/// Arguments for `tfcc run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Workspace manifest (YAML).
    #[arg(long)]
    pub manifest: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write the report here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// The workspace manifest file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub rules_dir: Option<PathBuf>,
    pub workspaces: Vec<WorkspaceEntry>,
}

/// One workspace as written in the manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceEntry {
    pub name: String,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub state: PathBuf,
}

/// A workspace with its entity and environment settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceTarget {
    pub name: String,
    pub entity: String,
    pub environment: String,
    pub state: PathBuf,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading manifest: {}", path.display()))?;
        let mut manifest: Manifest = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing manifest: {}", path.display()))?;
        if let Some(base) = path.parent() {
            manifest.rules_dir = manifest.rules_dir.map(|p| resolve_against(base, p));
            for workspace in &mut manifest.workspaces {
                workspace.state = resolve_against(base, std::mem::take(&mut workspace.state));
            }
        }
        Ok(manifest)
    }
}

impl WorkspaceEntry {
    /// Settle entity and environment. The entity defaults to the name's
    /// prefix before the first `-`; the environment comes from the explicit
    /// field, else from an `environment:<env>` tag.
    pub fn resolve(&self) -> Result<WorkspaceTarget> {
        let entity = match &self.entity {
            Some(entity) => entity.clone(),
            None => workspace_entity(&self.name).to_string(),
        };
        let environment = self
            .environment
            .clone()
            .or_else(|| environment_from_tags(&self.tags))
            .with_context(|| {
                format!(
                    "workspace {} has no environment: \
                     set `environment` or add an `{ENVIRONMENT_TAG_PREFIX}<env>` tag",
                    self.name
                )
            })?;
        Ok(WorkspaceTarget {
            name: self.name.clone(),
            entity,
            environment,
            state: self.state.clone(),
        })
    }
}

/// Entity of a workspace name: everything before the first `-`.
pub fn workspace_entity(name: &str) -> &str {
    name.split('-').next().unwrap_or(name)
}

/// The value of the first `environment:<env>` tag.
pub fn environment_from_tags(tags: &[String]) -> Option<String> {
    tags.iter()
        .find_map(|tag| tag.strip_prefix(ENVIRONMENT_TAG_PREFIX))
        .filter(|env| !env.is_empty())
        .map(str::to_string)
}

/// Execute `tfcc run`.
pub fn run_run(args: &RunArgs, config: &Config) -> Result<u8> {
    let manifest = Manifest::load(&args.manifest)?;
    let rules_dir = config.rules_dir(manifest.rules_dir.as_deref())?;
    let timestamp = RunTimestamp::now();
    let report = run_manifest(&manifest, &rules_dir, config, timestamp)?;
    write_output(args.out.as_deref(), &render_report(&report, args.format)?)?;
    Ok(outcome_code(report.is_compliant(), config.fail_on_non_compliant))
}

/// Check every workspace in the manifest and fold the report.
pub fn run_manifest(
    manifest: &Manifest,
    rules_dir: &Path,
    config: &Config,
    timestamp: RunTimestamp,
) -> Result<ComplianceReport> {
    let catalog = RuleCatalog::load(rules_dir)?;
    let targets = manifest
        .workspaces
        .iter()
        .map(WorkspaceEntry::resolve)
        .collect::<Result<Vec<_>>>()?;
    let run_dir = config
        .output_dir
        .as_ref()
        .map(|dir| dir.join(timestamp.to_label()));
    let evaluator = config.evaluator();

    let checked: Vec<(WorkspaceTarget, WorkspaceReport)> = targets
        .into_par_iter()
        .map(|target| -> Result<(WorkspaceTarget, WorkspaceReport)> {
            let rules = catalog.select(Some(&target.entity), Some(&target.environment));
            let results = check_state_file(&target.state, &rules, &evaluator)
                .with_context(|| format!("checking workspace {}", target.name))?;
            if let Some(run_dir) = &run_dir {
                persist_results(run_dir, &target, &results)?;
            }
            tracing::info!(
                workspace = %target.name,
                entity = %target.entity,
                environment = %target.environment,
                rules = rules.len(),
                "workspace checked"
            );
            let report = fold_workspace(results.into_iter().flatten());
            Ok((target, report))
        })
        .collect::<Result<_>>()?;

    let mut builder = ReportBuilder::new(timestamp);
    for (target, report) in checked {
        builder
            .add_workspace(&target.entity, target.name.clone(), report)
            .with_context(|| format!("adding workspace {}", target.name))?;
    }
    Ok(builder.build())
}

fn persist_results(
    run_dir: &Path,
    target: &WorkspaceTarget,
    results: &[Vec<Verdict>],
) -> Result<()> {
    let path = ResultKey::new(&target.entity, &target.name).path_in(run_dir);
    let encoded = encode_verdicts(results).context("encoding verdicts")?;
    write_output(Some(&path), &encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> WorkspaceEntry {
        WorkspaceEntry {
            name: name.into(),
            entity: None,
            environment: None,
            tags: vec![],
            state: PathBuf::from("state.json"),
        }
    }

    #[test]
    fn entity_is_name_prefix() {
        assert_eq!(workspace_entity("platform-api-prod"), "platform");
        assert_eq!(workspace_entity("standalone"), "standalone");
    }

    #[test]
    fn environment_from_field_or_tag() {
        let mut ws = entry("platform-api");
        assert!(ws.resolve().is_err());

        ws.tags = vec!["team:core".into(), "environment:qa".into()];
        let target = ws.resolve().unwrap();
        assert_eq!(target.entity, "platform");
        assert_eq!(target.environment, "qa");

        ws.environment = Some("PROD".into());
        ws.entity = Some("shared".into());
        let target = ws.resolve().unwrap();
        assert_eq!(target.entity, "shared");
        assert_eq!(target.environment, "PROD");
    }

    #[test]
    fn empty_environment_tag_is_ignored() {
        let mut ws = entry("platform-api");
        ws.tags = vec!["environment:".into()];
        assert!(ws.resolve().is_err());
    }

    #[test]
    fn manifest_paths_resolve_against_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspaces.yaml");
        std::fs::write(
            &path,
            "rules_dir: rules\nworkspaces:\n  - name: platform-api\n    environment: PROD\n    \
             state: states/api.tfstate\n",
        )
        .unwrap();
        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.rules_dir, Some(dir.path().join("rules")));
        assert_eq!(manifest.workspaces[0].state, dir.path().join("states/api.tfstate"));
    }
}
