//! # Report Types
//!
//! Sealed outputs of the aggregation builders. Fields are read through
//! accessors only; `is_compliant` at every level is computed when the level
//! is sealed, from the failed checks below it.
//!
//! Serialization uses the field names consumers of the JSON report already
//! expect (`compliant_check_count`, `failed_checks`, `checked_workspaces`,
//! `non_compliant_entities`, ...).

use std::collections::BTreeMap;

use serde::Serialize;

use tfcc_core::{RunTimestamp, Verdict};

/// Checks of one workspace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkspaceReport {
    pub(crate) checks: usize,
    pub(crate) compliant_check_count: usize,
    pub(crate) non_compliant_check_count: usize,
    pub(crate) compliant_checks: Vec<Verdict>,
    pub(crate) failed_checks: Vec<Verdict>,
    pub(crate) is_compliant: bool,
}

impl WorkspaceReport {
    /// Number of verdicts folded, before deduplication.
    pub fn checks(&self) -> usize {
        self.checks
    }

    pub fn compliant_check_count(&self) -> usize {
        self.compliant_check_count
    }

    pub fn non_compliant_check_count(&self) -> usize {
        self.non_compliant_check_count
    }

    /// Passed checks, one entry per (rule_name, resource_type, provider).
    pub fn compliant_checks(&self) -> &[Verdict] {
        &self.compliant_checks
    }

    /// Failed checks, one entry per (rule_name, resource_type, provider).
    pub fn failed_checks(&self) -> &[Verdict] {
        &self.failed_checks
    }

    /// True iff no check failed.
    pub fn is_compliant(&self) -> bool {
        self.is_compliant
    }
}

/// Workspaces of one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityReport {
    pub(crate) checked_workspaces: usize,
    pub(crate) compliant_workspaces: usize,
    pub(crate) non_compliant_workspaces: usize,
    pub(crate) workspaces: BTreeMap<String, WorkspaceReport>,
    pub(crate) is_compliant: bool,
}

impl EntityReport {
    pub fn checked_workspaces(&self) -> usize {
        self.checked_workspaces
    }

    pub fn compliant_workspaces(&self) -> usize {
        self.compliant_workspaces
    }

    pub fn non_compliant_workspaces(&self) -> usize {
        self.non_compliant_workspaces
    }

    pub fn workspaces(&self) -> &BTreeMap<String, WorkspaceReport> {
        &self.workspaces
    }

    pub fn workspace(&self, name: &str) -> Option<&WorkspaceReport> {
        self.workspaces.get(name)
    }

    /// Names of compliant workspaces, sorted.
    pub fn compliant_workspace_names(&self) -> Vec<&str> {
        self.workspace_names(true)
    }

    /// Names of non-compliant workspaces, sorted.
    pub fn non_compliant_workspace_names(&self) -> Vec<&str> {
        self.workspace_names(false)
    }

    /// True iff every workspace is compliant.
    pub fn is_compliant(&self) -> bool {
        self.is_compliant
    }

    fn workspace_names(&self, compliant: bool) -> Vec<&str> {
        self.workspaces
            .iter()
            .filter(|(_, w)| w.is_compliant == compliant)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Root of a compliance run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceReport {
    pub(crate) timestamp: RunTimestamp,
    pub(crate) checked_entity_count: usize,
    pub(crate) compliant_entity_count: usize,
    pub(crate) non_compliant_entity_count: usize,
    pub(crate) compliant_entities: Vec<String>,
    pub(crate) non_compliant_entities: Vec<String>,
    pub(crate) entities: BTreeMap<String, EntityReport>,
}

impl ComplianceReport {
    pub fn timestamp(&self) -> RunTimestamp {
        self.timestamp
    }

    pub fn checked_entity_count(&self) -> usize {
        self.checked_entity_count
    }

    pub fn compliant_entity_count(&self) -> usize {
        self.compliant_entity_count
    }

    pub fn non_compliant_entity_count(&self) -> usize {
        self.non_compliant_entity_count
    }

    pub fn compliant_entities(&self) -> &[String] {
        &self.compliant_entities
    }

    pub fn non_compliant_entities(&self) -> &[String] {
        &self.non_compliant_entities
    }

    pub fn entities(&self) -> &BTreeMap<String, EntityReport> {
        &self.entities
    }

    pub fn entity(&self, name: &str) -> Option<&EntityReport> {
        self.entities.get(name)
    }

    /// True iff no entity is non-compliant.
    pub fn is_compliant(&self) -> bool {
        self.non_compliant_entity_count == 0
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
