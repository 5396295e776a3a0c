//! # `tfcc check`
//!
//! Evaluates one state file against the rule catalog and writes the
//! per-rule verdict lists in the results file layout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use tfcc_core::Verdict;
use tfcc_rules::{Evaluator, Rule};
use tfcc_state::{build_index, evaluate_workspace, StateDocument};

use crate::catalog::RuleCatalog;
use crate::config::Config;
use crate::{outcome_code, write_output};

/// Arguments for `tfcc check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Terraform state file (JSON).
    #[arg(long)]
    pub state: PathBuf,

    /// Rule catalog root. Falls back to `rules_dir` in the config file.
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Only apply rules stored under this entity.
    #[arg(long)]
    pub entity: Option<String>,

    /// Only apply rules for this environment (plus `ALL`).
    #[arg(long)]
    pub environment: Option<String>,

    /// Write the verdict lists here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Execute `tfcc check`.
pub fn run_check(args: &CheckArgs, config: &Config) -> Result<u8> {
    let rules_dir = config.rules_dir(args.rules.as_deref())?;
    let catalog = RuleCatalog::load(&rules_dir)?;
    let rules = catalog.select(args.entity.as_deref(), args.environment.as_deref());
    if rules.is_empty() {
        tracing::warn!(
            entity = args.entity.as_deref().unwrap_or("*"),
            environment = args.environment.as_deref().unwrap_or("*"),
            "no rules selected"
        );
    }

    let results = check_state_file(&args.state, &rules, &config.evaluator())?;
    let encoded = tfcc_report::encode_verdicts(&results).context("encoding verdicts")?;
    write_output(args.out.as_deref(), &encoded)?;

    let verdicts: Vec<&Verdict> = results.iter().flatten().collect();
    let failed = verdicts.iter().filter(|v| !v.compliance_status).count();
    tracing::info!(
        state = %args.state.display(),
        rules = rules.len(),
        verdicts = verdicts.len(),
        failed,
        "check complete"
    );
    Ok(outcome_code(failed == 0, config.fail_on_non_compliant))
}

/// Read a state file, index it and apply `rules`.
pub fn check_state_file(
    path: &Path,
    rules: &[Rule],
    evaluator: &Evaluator,
) -> Result<Vec<Vec<Verdict>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading state file: {}", path.display()))?;
    let document = StateDocument::from_json(&content)
        .with_context(|| format!("decoding state file: {}", path.display()))?;
    let index = build_index(document)
        .with_context(|| format!("indexing state file: {}", path.display()))?;
    Ok(evaluate_workspace(rules, &index, evaluator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture(root: &Path) -> (PathBuf, PathBuf) {
        let rules = root.join("rules");
        let rule_dir = rules.join("platform/AWS/PROD");
        std::fs::create_dir_all(&rule_dir).unwrap();
        std::fs::write(
            rule_dir.join("bucket-private.json"),
            json!({
                "provider": "aws",
                "resource_type": "aws_s3_bucket",
                "description": "Buckets are private",
                "compliance_level": "hard_mandatory",
                "condition": {"operator": "and", "rules": [
                    {"key": "acl", "operator": "eq", "value": "private"}
                ]}
            })
            .to_string(),
        )
        .unwrap();

        let state = root.join("platform-api.tfstate");
        std::fs::write(
            &state,
            json!({"resources": [{
                "type": "aws_s3_bucket",
                "provider": "provider[\"registry.terraform.io/hashicorp/aws\"]",
                "instances": [
                    {"attributes": {"id": "logs", "acl": "private"}},
                    {"attributes": {"id": "www", "acl": "public-read"}}
                ]
            }]})
            .to_string(),
        )
        .unwrap();
        (rules, state)
    }

    #[test]
    fn writes_verdicts_and_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (rules, state) = fixture(dir.path());
        let out = dir.path().join("out/results.json");
        let args = CheckArgs {
            state,
            rules: Some(rules),
            entity: Some("platform".into()),
            environment: Some("PROD".into()),
            out: Some(out.clone()),
        };

        let config = Config {
            fail_on_non_compliant: true,
            ..Config::default()
        };
        assert_eq!(run_check(&args, &config).unwrap(), crate::EXIT_NON_COMPLIANT);
        assert_eq!(run_check(&args, &Config::default()).unwrap(), 0);

        let written = std::fs::read_to_string(out).unwrap();
        let verdicts = tfcc_report::decode_verdicts(&written).unwrap();
        assert_eq!(verdicts.len(), 2);
        assert!(verdicts[0].compliance_status);
        assert!(!verdicts[1].compliance_status);
    }

    #[test]
    fn missing_state_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let (rules, _) = fixture(dir.path());
        let args = CheckArgs {
            state: dir.path().join("absent.tfstate"),
            rules: Some(rules),
            entity: None,
            environment: None,
            out: None,
        };
        let err = run_check(&args, &Config::default()).unwrap_err();
        assert!(format!("{err:#}").contains("absent.tfstate"));
    }
}
