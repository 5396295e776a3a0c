//! # tfcc-core — Foundational Types for the Compliance Checker
//!
//! This crate is the leaf of the workspace DAG. It defines the value types
//! every other crate speaks: the attribute tree of a resource instance, the
//! normalized provider name, the compliance level of a rule, and the verdict
//! produced when a rule is applied to one instance.
//!
//! ## Key Design Principles
//!
//! 1. **Tagged attribute trees.** `AttributeValue` is a closed enum over the
//!    JSON shapes found in Terraform state. Path resolution pattern-matches on
//!    the tag at every segment; there is no runtime type inspection.
//!
//! 2. **Provider names are normalized once.** `ProviderName` can only be
//!    built through `normalize_provider()`, so a raw registry address never
//!    leaks into an index key or a verdict.
//!
//! 3. **Single `ComplianceLevel` enum.** Three variants, exhaustive `match`
//!    everywhere.
//!
//! 4. **UTC-only run timestamps.** `RunTimestamp` is second-precision UTC and
//!    renders in the `YYYY-MM-DD-HH-MM-SS` label format used to key report
//!    runs.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tfcc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod attribute;
pub mod error;
pub mod level;
pub mod provider;
pub mod temporal;
pub mod verdict;

// Re-export primary types for ergonomic imports.
pub use attribute::AttributeValue;
pub use error::TfccError;
pub use level::ComplianceLevel;
pub use provider::{normalize_provider, ProviderName};
pub use temporal::RunTimestamp;
pub use verdict::{ResourceId, Verdict, NO_ID_FOUND};
