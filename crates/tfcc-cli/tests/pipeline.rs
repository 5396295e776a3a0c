//! # Pipeline Integration Tests
//!
//! Manifest → catalog → per-workspace checks → persisted results → report,
//! then the persisted results folded again through `tfcc report`.

use std::path::Path;

use serde_json::json;

use tfcc_cli::config::Config;
use tfcc_cli::report::load_results;
use tfcc_cli::run::{run_manifest, run_run, Manifest, RunArgs};
use tfcc_cli::{render_report, OutputFormat, EXIT_NON_COMPLIANT};
use tfcc_core::RunTimestamp;

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn bucket_state(acls: &[&str]) -> String {
    let instances: Vec<_> = acls
        .iter()
        .enumerate()
        .map(|(i, acl)| json!({"attributes": {"id": format!("bucket-{i}"), "acl": acl}}))
        .collect();
    json!({
        "version": 4,
        "resources": [{
            "mode": "managed",
            "type": "aws_s3_bucket",
            "name": "this",
            "provider": "provider[\"registry.terraform.io/hashicorp/aws\"]",
            "instances": instances
        }]
    })
    .to_string()
}

fn rule(level: &str, acl: &str) -> String {
    json!({
        "provider": "aws",
        "resource_type": "aws_s3_bucket",
        "description": format!("ACL is {acl}"),
        "compliance_level": level,
        "condition": {"operator": "and", "rules": [
            {"key": "acl", "operator": "eq", "value": acl}
        ]}
    })
    .to_string()
}

/// Two entities: `platform` has one failing workspace, `billing` passes.
fn fixture(root: &Path) {
    write(&root.join("rules/platform/AWS/PROD/private.json"), &rule("hard_mandatory", "private"));
    write(&root.join("rules/platform/AWS/DEV/dev-only.json"), &rule("check", "never-matches"));
    write(&root.join("rules/billing/AWS/ALL/private.json"), &rule("soft_mandatory", "private"));
    write(&root.join("states/platform-api.json"), &bucket_state(&["private", "private"]));
    write(&root.join("states/platform-web.json"), &bucket_state(&["public-read"]));
    write(&root.join("states/billing-core.json"), &bucket_state(&["private"]));
    write(
        &root.join("workspaces.yaml"),
        "rules_dir: rules
workspaces:
  - name: platform-api
    environment: PROD
    state: states/platform-api.json
  - name: platform-web
    tags: [\"environment:prod\"]
    state: states/platform-web.json
  - name: billing-core
    tags: [\"environment:dev\"]
    state: states/billing-core.json
",
    );
}

#[test]
fn manifest_run_builds_report_and_persists_results() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    let manifest = Manifest::load(&dir.path().join("workspaces.yaml")).unwrap();
    let config = Config {
        output_dir: Some(dir.path().join("out")),
        ..Config::default()
    };
    let timestamp = RunTimestamp::parse("2024-03-01-08-30-00").unwrap();
    let rules_dir = manifest.rules_dir.clone().unwrap();

    let report = run_manifest(&manifest, &rules_dir, &config, timestamp).unwrap();
    assert_eq!(report.checked_entity_count(), 2);
    assert_eq!(report.compliant_entities(), &["billing".to_string()]);
    assert_eq!(report.non_compliant_entities(), &["platform".to_string()]);

    let platform = report.entity("platform").unwrap();
    assert_eq!(platform.non_compliant_workspace_names(), vec!["platform-web"]);
    let api = platform.workspace("platform-api").unwrap();
    assert_eq!(api.checks(), 2);
    assert_eq!(api.compliant_checks()[0].resource_id.ids(), vec!["bucket-0", "bucket-1"]);

    let run_dir = dir.path().join("out/2024-03-01-08-30-00");
    assert!(run_dir.join("platform/platform-web/results.json").is_file());

    let reloaded = load_results(&run_dir, timestamp).unwrap();
    assert_eq!(
        serde_json::to_value(&reloaded).unwrap(),
        serde_json::to_value(&report).unwrap()
    );

    let markdown = render_report(&report, OutputFormat::Markdown).unwrap();
    assert!(markdown.contains("### Workspace: platform-web"));
    let row = "| private | ACL is private | aws_s3_bucket | bucket-0 | AWS | Hard Mandatory |";
    assert!(markdown.contains(row));
}

#[test]
fn run_command_exit_code_follows_config() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    let args = RunArgs {
        manifest: dir.path().join("workspaces.yaml"),
        format: OutputFormat::Json,
        out: Some(dir.path().join("report.json")),
    };

    assert_eq!(run_run(&args, &Config::default()).unwrap(), 0);
    let strict = Config {
        fail_on_non_compliant: true,
        ..Config::default()
    };
    assert_eq!(run_run(&args, &strict).unwrap(), EXIT_NON_COMPLIANT);

    let content = std::fs::read_to_string(dir.path().join("report.json")).unwrap();
    let written: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(written["non_compliant_entity_count"], 1);
}

#[test]
fn workspace_without_environment_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    fixture(dir.path());
    write(
        &dir.path().join("workspaces.yaml"),
        "rules_dir: rules\nworkspaces:\n  - name: platform-api\n    \
         state: states/platform-api.json\n",
    );
    let args = RunArgs {
        manifest: dir.path().join("workspaces.yaml"),
        format: OutputFormat::Json,
        out: None,
    };
    let err = run_run(&args, &Config::default()).unwrap_err();
    assert!(format!("{err:#}").contains("platform-api has no environment"));
}
