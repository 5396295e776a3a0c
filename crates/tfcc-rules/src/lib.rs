//! # tfcc-rules — Rules and Condition Evaluation
//!
//! A rule is a provider/resource-type scoped assertion with a boolean
//! condition attached. This crate decodes rules, evaluates their conditions
//! against a resource instance's attribute tree, and validates authored rule
//! documents.
//!
//! ## Architecture
//!
//! - **Operator** (`operator.rs`): closed `OperatorKind` (leaf comparisons)
//!   and `CombinatorKind` (`and|or|nand|nor`) enums.
//!
//! - **Condition** (`condition.rs`): the decoded condition tree, one
//!   combinator over leaf comparisons, or a single bare comparison.
//!
//! - **Evaluation** (`evaluation.rs`): the `Evaluator`, with an exhaustive
//!   evaluation function per operator kind and an explicit
//!   `MissingKeyPolicy` for `not_contains` on a missing key.
//!
//! - **Rule** (`rule.rs`): `Rule` and the `RuleSource`/`RuleDocument`
//!   shapes it is decoded from.
//!
//! - **Validation** (`validation.rs`): ingestion checks for authored rule
//!   documents stored under `ENTITY/PROVIDER/ENV/<name>.json`.
//!
//! ## Crate Policy
//!
//! - Evaluation never panics and never aborts on a bad leaf: a bad leaf is
//!   `false` plus an error message.
//! - Structural problems (malformed conditions, nested combinators) are
//!   rejected when the rule is decoded, not when it is evaluated.

pub mod condition;
pub mod error;
pub mod evaluation;
pub mod operator;
pub mod rule;
pub mod validation;

pub use condition::{
    AnchoredPattern, Combinator, CombinatorOperator, Comparison, Condition, LeafOperator,
};
pub use error::RuleError;
pub use evaluation::{
    evaluate_condition, evaluate_leaf, Evaluator, MissingKeyPolicy,
    DEFAULT_NOT_CONTAINS_ON_MISSING_KEY,
};
pub use operator::{CombinatorKind, OperatorKind};
pub use rule::{ConditionSource, Rule, RuleDocument, RuleSource};
pub use validation::{validate_rule_document, RuleIssue, RuleKey};
