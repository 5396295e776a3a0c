//! # Error Types — Structured Error Hierarchy
//!
//! Defines the foundational error type shared by the compliance checker
//! crates. All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations. Higher crates define their own enums (`RuleError`,
//! `StateError`, `ReportError`) and wrap this one where they parse core
//! values.

use thiserror::Error;

/// Top-level error type for the foundational value types.
#[derive(Error, Debug)]
pub enum TfccError {
    /// A value did not match the expected schema (unknown enum name,
    /// malformed identifier).
    #[error("schema validation error: {0}")]
    SchemaValidation(String),

    /// A timestamp string could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
