//! # Compliance Level — Rule Severity
//!
//! Defines the `ComplianceLevel` enum. This is the ONE definition used by
//! rule decoding, document validation, verdicts and report rendering. Every
//! `match` on `ComplianceLevel` is exhaustive.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::TfccError;

/// Severity classification of a rule.
///
/// | Level | Meaning |
/// |-------|---------|
/// | `check` | Informational; failures are reported but not enforced |
/// | `soft_mandatory` | Failures require an override to proceed |
/// | `hard_mandatory` | Failures block |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceLevel {
    /// Informational check.
    Check,
    /// Overridable mandatory rule.
    SoftMandatory,
    /// Non-overridable mandatory rule.
    HardMandatory,
}

/// Total number of compliance levels.
pub const COMPLIANCE_LEVEL_COUNT: usize = 3;

impl ComplianceLevel {
    /// Returns all levels, least to most severe.
    pub fn all_levels() -> &'static [ComplianceLevel] {
        &[Self::Check, Self::SoftMandatory, Self::HardMandatory]
    }

    /// Returns the snake_case identifier used in rule documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::SoftMandatory => "soft_mandatory",
            Self::HardMandatory => "hard_mandatory",
        }
    }

    /// Human-readable label used in rendered reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Check => "Check",
            Self::SoftMandatory => "Soft Mandatory",
            Self::HardMandatory => "Hard Mandatory",
        }
    }
}

impl std::fmt::Display for ComplianceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplianceLevel {
    type Err = TfccError;

    /// Parse a level from its snake_case identifier. Case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "check" => Ok(Self::Check),
            "soft_mandatory" => Ok(Self::SoftMandatory),
            "hard_mandatory" => Ok(Self::HardMandatory),
            other => Err(TfccError::SchemaValidation(format!(
                "invalid compliance level {other:?}; \
                 must be one of check, soft_mandatory, hard_mandatory"
            ))),
        }
    }
}
