use thiserror::Error;

/// Errors raised while folding verdicts into a report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// A result record's `compliance_status` is not a boolean. Fatal to the
    /// workspace being folded.
    #[error("rule {rule_name:?} produced an invalid compliance status")]
    InvalidComplianceStatus {
        /// Name of the rule the record belongs to.
        rule_name: String,
    },

    /// The same workspace name was folded twice into one entity.
    #[error("workspace {workspace:?} appears more than once in entity {entity:?}")]
    DuplicateWorkspace { entity: String, workspace: String },

    /// The same entity name was folded twice into one report.
    #[error("entity {entity:?} appears more than once in the report")]
    DuplicateEntity { entity: String },

    /// A results path is not `<entity>/<workspace>/results.json`.
    #[error("invalid results path {path:?}: {reason}")]
    InvalidResultKey { path: String, reason: String },

    /// A result file is not valid JSON or a record is malformed.
    #[error("result records could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}
