//! # Rule Catalog
//!
//! Loads authored rule documents from a directory laid out as
//! `ENTITY/PROVIDER/ENV/<rule_name>.json` and selects the rules that apply
//! to a workspace.
//!
//! A document that fails key parsing, JSON decoding or validation is
//! skipped with a warning and recorded as a [`CatalogProblem`]; the rest of
//! the catalog still loads. `tfcc rules validate` turns those problems into
//! a non-zero exit.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use tfcc_rules::{validate_rule_document, Rule, RuleDocument, RuleKey};

/// A rule together with the key it was stored under.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub key: RuleKey,
    pub rule: Rule,
}

/// A rule file that could not be admitted.
#[derive(Debug, Clone)]
pub struct CatalogProblem {
    /// Path relative to the catalog root.
    pub path: String,
    pub messages: Vec<String>,
}

/// The admitted rules of a catalog directory, sorted by key.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    entries: Vec<CatalogEntry>,
    problems: Vec<CatalogProblem>,
}

impl RuleCatalog {
    /// Load every `.json` file below `root`.
    pub fn load(root: &Path) -> Result<Self> {
        let mut catalog = Self::default();
        for relative in discover_json_files(root)? {
            let path = root.join(&relative);
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading rule file: {}", path.display()))?;
            match admit(&relative, &content) {
                Ok(entry) => catalog.entries.push(entry),
                Err(messages) => {
                    tracing::warn!(
                        path = %relative,
                        problems = messages.len(),
                        "skipping invalid rule file"
                    );
                    catalog.problems.push(CatalogProblem {
                        path: relative,
                        messages,
                    });
                }
            }
        }
        catalog.entries.sort_by(|a, b| a.key.to_string().cmp(&b.key.to_string()));
        tracing::info!(
            root = %root.display(),
            rules = catalog.entries.len(),
            invalid = catalog.problems.len(),
            "loaded rule catalog"
        );
        Ok(catalog)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn problems(&self) -> &[CatalogProblem] {
        &self.problems
    }

    /// Rules for a workspace. `None` matches every entity or environment;
    /// rules stored under `ALL` match every entity or environment.
    pub fn select(&self, entity: Option<&str>, environment: Option<&str>) -> Vec<Rule> {
        self.entries
            .iter()
            .filter(|entry| entity.map_or(true, |e| entry.key.matches_entity(e)))
            .filter(|entry| environment.map_or(true, |e| entry.key.matches_environment(e)))
            .map(|entry| entry.rule.clone())
            .collect()
    }
}

/// Parse, validate and decode one rule document. Returns every problem found.
fn admit(relative: &str, content: &str) -> std::result::Result<CatalogEntry, Vec<String>> {
    let key = RuleKey::parse(relative).map_err(|e| vec![e.to_string()])?;
    let value: Value =
        serde_json::from_str(content).map_err(|e| vec![format!("invalid JSON: {e}")])?;

    let issues = validate_rule_document(&value, &key);
    if !issues.is_empty() {
        return Err(issues.iter().map(ToString::to_string).collect());
    }

    let document: RuleDocument = serde_json::from_value(value).map_err(|e| vec![e.to_string()])?;
    let rule = Rule::from_source(document.into_source(key.rule_name.clone()))
        .map_err(|e| vec![e.to_string()])?;
    Ok(CatalogEntry { key, rule })
}

/// Relative paths (with `/` separators) of all `.json` files below `root`,
/// sorted.
pub fn discover_json_files(root: &Path) -> Result<Vec<String>> {
    if !root.is_dir() {
        anyhow::bail!("rules directory does not exist: {}", root.display());
    }
    let mut found = Vec::new();
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = std::fs::read_dir(&dir)
            .with_context(|| format!("reading directory: {}", dir.display()))?;
        for entry in entries {
            let path = entry
                .with_context(|| format!("reading directory entry in {}", dir.display()))?
                .path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(relative) = relative_key(root, &path) {
                    found.push(relative);
                }
            }
        }
    }
    found.sort();
    Ok(found)
}

/// `path` relative to `root`, joined with `/` regardless of platform.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Option<Vec<&str>> =
        relative.components().map(|c| c.as_os_str().to_str()).collect();
    Some(segments?.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_rule(root: &Path, relative: &str, doc: &Value) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, doc.to_string()).unwrap();
    }

    fn rule_doc(provider: &str) -> Value {
        json!({
            "provider": provider,
            "resource_type": "aws_s3_bucket",
            "description": "Versioning enabled",
            "compliance_level": "check",
            "condition": {"operator": "and", "rules": [
                {"key": "versioning.0.enabled", "operator": "eq", "value": true}
            ]}
        })
    }

    #[test]
    fn loads_and_selects_rules() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_rule(root, "platform/AWS/PROD/versioning.json", &rule_doc("hashicorp/aws"));
        write_rule(root, "platform/AWS/ALL/everywhere.json", &rule_doc("aws"));
        write_rule(root, "platform/AWS/DEV/dev-only.json", &rule_doc("aws"));
        write_rule(root, "billing/AWS/ALL/billing.json", &rule_doc("aws"));
        write_rule(root, "ALL/AWS/ALL/org-wide.json", &rule_doc("aws"));
        write_rule(root, "ALL/AWS/DEV/org-dev.json", &rule_doc("aws"));

        let catalog = RuleCatalog::load(root).unwrap();
        assert_eq!(catalog.entries().len(), 6);
        assert!(catalog.problems().is_empty());

        let names = |rules: Vec<Rule>| rules.into_iter().map(|r| r.rule_name).collect::<Vec<_>>();
        assert_eq!(
            names(catalog.select(Some("platform"), Some("prod"))),
            vec!["org-wide", "everywhere", "versioning"]
        );
        assert_eq!(
            names(catalog.select(Some("billing"), Some("dev"))),
            vec!["org-wide", "org-dev", "billing"]
        );
        assert_eq!(catalog.select(None, None).len(), 6);
        assert_eq!(catalog.select(Some("platform"), None).len(), 5);
        assert_eq!(names(catalog.select(None, Some("prod"))).len(), 4);
    }

    #[test]
    fn invalid_files_are_recorded_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_rule(root, "platform/AWS/PROD/good.json", &rule_doc("aws"));
        write_rule(root, "platform/AWS/PROD/wrong-provider.json", &rule_doc("azurerm"));
        write_rule(root, "platform/AWS/STAGE/bad-env.json", &rule_doc("aws"));
        std::fs::write(root.join("platform/AWS/PROD/broken.json"), "{").unwrap();
        std::fs::write(root.join("README.md"), "not a rule").unwrap();

        let catalog = RuleCatalog::load(root).unwrap();
        assert_eq!(catalog.entries().len(), 1);
        let paths: Vec<&str> = catalog.problems().iter().map(|p| p.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "platform/AWS/PROD/broken.json",
                "platform/AWS/PROD/wrong-provider.json",
                "platform/AWS/STAGE/bad-env.json",
            ]
        );
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RuleCatalog::load(&dir.path().join("absent")).is_err());
    }
}
