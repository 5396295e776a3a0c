//! # Aggregation
//!
//! Builders are owned and sealed bottom-up: a [`WorkspaceBuilder`] becomes a
//! [`WorkspaceReport`], workspace reports are handed to an
//! [`EntityBuilder`], and entity reports to a [`ReportBuilder`]. Counts and
//! compliance are computed when each level is sealed. Nothing above the
//! workspace level re-evaluates a rule.

use std::collections::BTreeMap;

use tfcc_core::{RunTimestamp, Verdict};

use crate::error::ReportError;
use crate::report::{ComplianceReport, EntityReport, WorkspaceReport};

/// Insert a verdict into a deduplicated bucket.
///
/// If the bucket already holds an entry with the same
/// (`rule_name`, `resource_type`, `provider`), the verdict's resource id is
/// unioned into that entry. Otherwise the verdict is appended with its id
/// converted to a one-element set. Linear in the bucket size.
pub fn add_verdict(bucket: &mut Vec<Verdict>, verdict: Verdict) {
    match bucket.iter_mut().find(|existing| existing.same_identity(&verdict)) {
        Some(existing) => existing.resource_id.union(verdict.resource_id),
        None => {
            let mut verdict = verdict;
            verdict.resource_id = verdict.resource_id.into_set();
            bucket.push(verdict);
        }
    }
}

/// Accumulates one workspace's verdicts.
#[derive(Debug, Default)]
pub struct WorkspaceBuilder {
    checks: usize,
    compliant_check_count: usize,
    non_compliant_check_count: usize,
    compliant_checks: Vec<Verdict>,
    failed_checks: Vec<Verdict>,
}

impl WorkspaceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a verdict into the passed or failed bucket.
    pub fn add(&mut self, verdict: Verdict) {
        self.checks += 1;
        if verdict.compliance_status {
            self.compliant_check_count += 1;
            add_verdict(&mut self.compliant_checks, verdict);
        } else {
            self.non_compliant_check_count += 1;
            add_verdict(&mut self.failed_checks, verdict);
        }
    }

    pub fn extend(&mut self, verdicts: impl IntoIterator<Item = Verdict>) {
        for verdict in verdicts {
            self.add(verdict);
        }
    }

    pub fn build(self) -> WorkspaceReport {
        WorkspaceReport {
            is_compliant: self.failed_checks.is_empty(),
            checks: self.checks,
            compliant_check_count: self.compliant_check_count,
            non_compliant_check_count: self.non_compliant_check_count,
            compliant_checks: self.compliant_checks,
            failed_checks: self.failed_checks,
        }
    }
}

/// Collects the sealed workspace reports of one entity.
#[derive(Debug)]
pub struct EntityBuilder {
    entity: String,
    workspaces: BTreeMap<String, WorkspaceReport>,
}

impl EntityBuilder {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            workspaces: BTreeMap::new(),
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Add a workspace. A name already present is rejected.
    pub fn add_workspace(
        &mut self,
        name: impl Into<String>,
        report: WorkspaceReport,
    ) -> Result<(), ReportError> {
        let name = name.into();
        if self.workspaces.contains_key(&name) {
            return Err(ReportError::DuplicateWorkspace {
                entity: self.entity.clone(),
                workspace: name,
            });
        }
        self.workspaces.insert(name, report);
        Ok(())
    }

    pub fn build(self) -> EntityReport {
        let compliant_workspaces = self.workspaces.values().filter(|w| w.is_compliant).count();
        let checked_workspaces = self.workspaces.len();
        EntityReport {
            checked_workspaces,
            compliant_workspaces,
            non_compliant_workspaces: checked_workspaces - compliant_workspaces,
            is_compliant: compliant_workspaces == checked_workspaces,
            workspaces: self.workspaces,
        }
    }
}

/// Collects entity reports for one run.
///
/// Workspaces can be added directly with [`ReportBuilder::add_workspace`];
/// their entity builders are created on first use and sealed in
/// [`ReportBuilder::build`].
#[derive(Debug)]
pub struct ReportBuilder {
    timestamp: RunTimestamp,
    pending: BTreeMap<String, EntityBuilder>,
    sealed: BTreeMap<String, EntityReport>,
}

impl ReportBuilder {
    pub fn new(timestamp: RunTimestamp) -> Self {
        Self {
            timestamp,
            pending: BTreeMap::new(),
            sealed: BTreeMap::new(),
        }
    }

    /// Add a workspace under an entity.
    pub fn add_workspace(
        &mut self,
        entity: &str,
        workspace: impl Into<String>,
        report: WorkspaceReport,
    ) -> Result<(), ReportError> {
        if self.sealed.contains_key(entity) {
            return Err(ReportError::DuplicateEntity {
                entity: entity.to_string(),
            });
        }
        self.pending
            .entry(entity.to_string())
            .or_insert_with(|| EntityBuilder::new(entity))
            .add_workspace(workspace, report)
    }

    /// Add an already sealed entity report.
    pub fn add_entity(
        &mut self,
        entity: impl Into<String>,
        report: EntityReport,
    ) -> Result<(), ReportError> {
        let entity = entity.into();
        if self.sealed.contains_key(&entity) || self.pending.contains_key(&entity) {
            return Err(ReportError::DuplicateEntity { entity });
        }
        self.sealed.insert(entity, report);
        Ok(())
    }

    pub fn build(self) -> ComplianceReport {
        let mut entities = self.sealed;
        for (name, builder) in self.pending {
            entities.insert(name, builder.build());
        }

        let (compliant, non_compliant): (Vec<_>, Vec<_>) =
            entities.iter().partition(|(_, entity)| entity.is_compliant());
        let compliant_entities: Vec<String> =
            compliant.into_iter().map(|(n, _)| n.clone()).collect();
        let non_compliant_entities: Vec<String> =
            non_compliant.into_iter().map(|(n, _)| n.clone()).collect();

        tracing::info!(
            timestamp = %self.timestamp,
            entities = entities.len(),
            non_compliant = non_compliant_entities.len(),
            "compliance report folded"
        );

        ComplianceReport {
            timestamp: self.timestamp,
            checked_entity_count: entities.len(),
            compliant_entity_count: compliant_entities.len(),
            non_compliant_entity_count: non_compliant_entities.len(),
            compliant_entities,
            non_compliant_entities,
            entities,
        }
    }
}

/// Fold one workspace's verdicts.
pub fn fold_workspace(verdicts: impl IntoIterator<Item = Verdict>) -> WorkspaceReport {
    let mut builder = WorkspaceBuilder::new();
    builder.extend(verdicts);
    builder.build()
}

/// Roll named workspace reports up into an entity report.
pub fn fold_entity(
    entity: &str,
    workspaces: impl IntoIterator<Item = (String, WorkspaceReport)>,
) -> Result<EntityReport, ReportError> {
    let mut builder = EntityBuilder::new(entity);
    for (name, report) in workspaces {
        builder.add_workspace(name, report)?;
    }
    Ok(builder.build())
}

/// Roll named entity reports up into the run report.
pub fn fold_report(
    timestamp: RunTimestamp,
    entities: impl IntoIterator<Item = (String, EntityReport)>,
) -> Result<ComplianceReport, ReportError> {
    let mut builder = ReportBuilder::new(timestamp);
    for (name, report) in entities {
        builder.add_entity(name, report)?;
    }
    Ok(builder.build())
}
