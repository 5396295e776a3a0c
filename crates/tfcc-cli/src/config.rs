//! # Configuration
//!
//! Optional YAML file passed with `--config`:
//!
//! ```yaml
//! rules_dir: rules
//! not_contains_on_missing_key: compliant   # or non_compliant
//! fail_on_non_compliant: false
//! output_dir: out
//! ```
//!
//! Every key is optional. Relative paths are resolved against the directory
//! holding the config file. Command-line flags take precedence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use tfcc_rules::{Evaluator, MissingKeyPolicy};

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root of the rule catalog (`ENTITY/PROVIDER/ENV/<name>.json`).
    pub rules_dir: Option<PathBuf>,
    /// Outcome of `not_contains` on a missing attribute.
    pub not_contains_on_missing_key: MissingKeyPolicy,
    /// Exit with code 2 when the result is non-compliant.
    pub fail_on_non_compliant: bool,
    /// Where `tfcc run` writes per-workspace result files.
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Load the config file, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file: {}", path.display()))?;
        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config file: {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.rules_dir = config.rules_dir.map(|p| resolve_against(base, p));
            config.output_dir = config.output_dir.map(|p| resolve_against(base, p));
        }
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn evaluator(&self) -> Evaluator {
        Evaluator::with_not_contains_on_missing_key(self.not_contains_on_missing_key)
    }

    /// The rules directory from the command line, else from the config.
    pub fn rules_dir(&self, from_args: Option<&Path>) -> Result<PathBuf> {
        from_args
            .map(Path::to_path_buf)
            .or_else(|| self.rules_dir.clone())
            .context("no rules directory: pass --rules or set rules_dir in the config file")
    }
}

/// Join a relative path onto `base`; absolute paths are kept.
pub fn resolve_against(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_gives_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.not_contains_on_missing_key, MissingKeyPolicy::Compliant);
    }

    #[test]
    fn loads_yaml_and_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tfcc.yaml");
        std::fs::write(
            &path,
            "rules_dir: rules\n\
             not_contains_on_missing_key: non_compliant\n\
             fail_on_non_compliant: true\n\
             output_dir: /var/tfcc\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.rules_dir, Some(dir.path().join("rules")));
        assert_eq!(config.output_dir, Some(PathBuf::from("/var/tfcc")));
        assert!(config.fail_on_non_compliant);
        assert_eq!(
            config.evaluator().not_contains_on_missing_key(),
            MissingKeyPolicy::NonCompliant
        );
    }

    #[test]
    fn rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tfcc.yaml");
        std::fs::write(&path, "rule_dir: rules\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn command_line_rules_dir_wins() {
        let config = Config {
            rules_dir: Some(PathBuf::from("from-config")),
            ..Config::default()
        };
        assert_eq!(
            config.rules_dir(Some(Path::new("from-args"))).unwrap(),
            PathBuf::from("from-args")
        );
        assert_eq!(config.rules_dir(None).unwrap(), PathBuf::from("from-config"));
        assert!(Config::default().rules_dir(None).is_err());
    }
}
