//! # Operators
//!
//! Leaf comparisons and combinators are closed enums. Each name maps to
//! exactly one variant and every evaluation `match` is exhaustive, so an
//! operator cannot be silently left unmapped.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use tfcc_core::TfccError;

/// Comparison applied by a leaf rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Eq,
    Neq,
    Contains,
    NotContains,
    Exists,
    NotExists,
    Matches,
    NotMatches,
}

impl OperatorKind {
    pub fn all() -> &'static [OperatorKind] {
        &[
            Self::Eq,
            Self::Neq,
            Self::Contains,
            Self::NotContains,
            Self::Exists,
            Self::NotExists,
            Self::Matches,
            Self::NotMatches,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::Exists => "exists",
            Self::NotExists => "not_exists",
            Self::Matches => "matches",
            Self::NotMatches => "not_matches",
        }
    }
}

impl std::fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatorKind {
    type Err = TfccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(Self::Eq),
            "neq" => Ok(Self::Neq),
            "contains" => Ok(Self::Contains),
            "not_contains" => Ok(Self::NotContains),
            "exists" => Ok(Self::Exists),
            "not_exists" => Ok(Self::NotExists),
            "matches" => Ok(Self::Matches),
            "not_matches" => Ok(Self::NotMatches),
            other => Err(TfccError::SchemaValidation(format!(
                "unknown comparison operator: {other:?}"
            ))),
        }
    }
}

/// Boolean combinator over the results of a condition's leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinatorKind {
    And,
    Or,
    Nand,
    Nor,
}

impl CombinatorKind {
    pub fn all() -> &'static [CombinatorKind] {
        &[Self::And, Self::Or, Self::Nand, Self::Nor]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Nand => "nand",
            Self::Nor => "nor",
        }
    }

    /// Reduce leaf results. `and` of nothing is `true`, `or` of nothing is
    /// `false`.
    pub fn aggregate(&self, results: &[bool]) -> bool {
        match self {
            Self::And => results.iter().all(|r| *r),
            Self::Or => results.iter().any(|r| *r),
            Self::Nand => !results.iter().all(|r| *r),
            Self::Nor => !results.iter().any(|r| *r),
        }
    }
}

impl std::fmt::Display for CombinatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CombinatorKind {
    type Err = TfccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            "nand" => Ok(Self::Nand),
            "nor" => Ok(Self::Nor),
            other => Err(TfccError::SchemaValidation(format!(
                "unknown condition operator: {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_names_parse_back() {
        for op in OperatorKind::all() {
            assert_eq!(op.as_str().parse::<OperatorKind>().unwrap(), *op);
        }
        for op in CombinatorKind::all() {
            assert_eq!(op.as_str().parse::<CombinatorKind>().unwrap(), *op);
        }
    }

    #[test]
    fn combinator_names_are_not_comparisons() {
        for op in CombinatorKind::all() {
            assert!(op.as_str().parse::<OperatorKind>().is_err());
        }
    }

    #[test]
    fn empty_identity_elements() {
        assert!(CombinatorKind::And.aggregate(&[]));
        assert!(!CombinatorKind::Or.aggregate(&[]));
        assert!(!CombinatorKind::Nand.aggregate(&[]));
        assert!(CombinatorKind::Nor.aggregate(&[]));
    }

    #[test]
    fn aggregate_truth_table() {
        let mixed = [true, false];
        assert!(!CombinatorKind::And.aggregate(&mixed));
        assert!(CombinatorKind::Or.aggregate(&mixed));
        assert!(CombinatorKind::Nand.aggregate(&mixed));
        assert!(!CombinatorKind::Nor.aggregate(&mixed));

        let all_true = [true, true];
        assert!(CombinatorKind::And.aggregate(&all_true));
        assert!(!CombinatorKind::Nand.aggregate(&all_true));

        let all_false = [false, false];
        assert!(!CombinatorKind::Or.aggregate(&all_false));
        assert!(CombinatorKind::Nor.aggregate(&all_false));
    }
}
