//! # tfcc-report — Compliance Report Aggregation
//!
//! Folds per-instance verdicts into the three-level compliance report:
//!
//! ```text
//! ComplianceReport (run timestamp)
//! └── EntityReport        per entity
//!     └── WorkspaceReport per workspace
//!         ├── compliant_checks  deduplicated by (rule_name, resource_type, provider)
//!         └── failed_checks
//! ```
//!
//! ## Modules
//!
//! - **Aggregate** (`aggregate.rs`): `add_verdict`, the owned
//!   `WorkspaceBuilder` / `EntityBuilder` / `ReportBuilder`, and the
//!   `fold_*` functions built on them.
//! - **Report** (`report.rs`): the sealed report types. Compliance is derived
//!   when a level is sealed and cannot be set independently.
//! - **Records** (`records.rs`): decoding verdict lists read back from
//!   `<entity>/<workspace>/results.json` files.
//! - **Markdown** (`markdown.rs`): human-readable rendering of a report.

pub mod aggregate;
pub mod error;
pub mod markdown;
pub mod records;
pub mod report;

pub use aggregate::{
    add_verdict, fold_entity, fold_report, fold_workspace, EntityBuilder, ReportBuilder,
    WorkspaceBuilder,
};
pub use error::ReportError;
pub use markdown::render_markdown;
pub use records::{decode_verdicts, encode_verdicts, ResultKey, RESULTS_FILE_NAME};
pub use report::{ComplianceReport, EntityReport, WorkspaceReport};
