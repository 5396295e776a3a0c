//! # tfcc-state — State Documents, Resource Index and Rule Application
//!
//! Turns a Terraform state document into something rules can be applied to.
//!
//! ## Modules
//!
//! - **Document** (`document.rs`): `StateDocument`, the decoded
//!   `{ resources: [ { type, provider, instances: [ { attributes } ] } ] }`
//!   shape plus the state's version metadata.
//!
//! - **Index** (`index.rs`): `ResourceIndex`, resources grouped by
//!   normalized provider and resource type, in sorted key order.
//!
//! - **Checker** (`checker.rs`): `apply_rule` emits one verdict per resource
//!   instance; `evaluate_workspace` applies a rule set in parallel.
//!
//! ## Crate Policy
//!
//! - A resource record without `type` or `provider` fails the whole index
//!   build. It is never dropped silently.
//! - A rule whose provider/resource type has no bucket in the index yields
//!   zero verdicts. That is not an error.

pub mod checker;
pub mod document;
pub mod error;
pub mod index;

pub use checker::{apply_rule, evaluate_workspace};
pub use document::{ResourceInstance, ResourceRecord, StateDocument};
pub use error::StateError;
pub use index::{build_index, ResourceIndex};
