//! # Condition Evaluation
//!
//! Evaluates leaf comparisons and combinators against one resource
//! instance's attribute tree.
//!
//! Every evaluation yields a boolean plus error text. Nothing here returns
//! `Err` or panics: an invalid leaf (missing key, unknown operator, operand
//! of the wrong type, bad regex) contributes `false` and a message, and its
//! siblings are still evaluated.
//!
//! ## Operator Table
//!
//! | operator | compliant when | attribute absent |
//! |---|---|---|
//! | `eq` / `neq` | actual (not) equal to expected, numbers numerically | equal only to `null` |
//! | `contains` | substring / sequence element / mapping key | `false` + [`KEY_NOT_FOUND`] |
//! | `not_contains` | negation of `contains` | per [`MissingKeyPolicy`] |
//! | `exists` / `not_exists` | existence equals (differs from) the operand | does not exist |
//! | `matches` / `not_matches` | pattern matches at the start of the string form | `None` |
//!
//! The string form of a boolean is `True` or `False` and that of `null` is
//! `None`; other values use their display form.

use tfcc_core::AttributeValue;

use crate::condition::{AnchoredPattern, CombinatorOperator, Comparison, Condition, LeafOperator};
use crate::operator::OperatorKind;

/// Error for a leaf missing its `key` or `operator`.
pub const INVALID_RULE: &str = "Invalid rule";

/// Error for a combinator with a missing or unrecognized operator.
pub const INVALID_CONDITION_OPERATOR: &str = "Invalid condition operator";

/// Error for `contains` on an attribute path that does not resolve.
pub const KEY_NOT_FOUND: &str = "Key can't be found in resource attributes.";

/// String form an absent attribute takes for `matches` / `not_matches`.
pub const ABSENT_STRING_FORM: &str = "None";

/// Outcome of `not_contains` when the attribute path does not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingKeyPolicy {
    /// Nothing to find, so the leaf passes with no error.
    #[default]
    Compliant,
    /// The leaf fails with [`KEY_NOT_FOUND`], mirroring `contains`.
    NonCompliant,
}

/// Policy used by [`Evaluator::default`] and the free functions.
pub const DEFAULT_NOT_CONTAINS_ON_MISSING_KEY: MissingKeyPolicy = MissingKeyPolicy::Compliant;

/// Evaluates conditions under a fixed [`MissingKeyPolicy`].
///
/// Stateless apart from the policy; cheap to copy and safe to share across
/// threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    not_contains_on_missing_key: MissingKeyPolicy,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            not_contains_on_missing_key: DEFAULT_NOT_CONTAINS_ON_MISSING_KEY,
        }
    }

    pub fn with_not_contains_on_missing_key(policy: MissingKeyPolicy) -> Self {
        Self {
            not_contains_on_missing_key: policy,
        }
    }

    pub fn not_contains_on_missing_key(&self) -> MissingKeyPolicy {
        self.not_contains_on_missing_key
    }

    /// Evaluate one comparison. The error is `None` when evaluation itself
    /// succeeded, whatever the boolean.
    pub fn evaluate_leaf(
        &self,
        comparison: &Comparison,
        attributes: &AttributeValue,
    ) -> (bool, Option<String>) {
        let key = match comparison.key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return (false, Some(INVALID_RULE.to_string())),
        };
        let operator = match &comparison.operator {
            None => return (false, Some(INVALID_RULE.to_string())),
            Some(LeafOperator::Unknown(name)) if name.is_empty() => {
                return (false, Some(INVALID_RULE.to_string()))
            }
            Some(LeafOperator::Unknown(name)) => {
                return (false, Some(format!("Invalid operator: {name}")))
            }
            Some(LeafOperator::Known(kind)) => *kind,
        };

        let actual = attributes.resolve(key);
        let expected = &comparison.value;
        let outcome = match operator {
            OperatorKind::Eq => Ok(equals(actual, expected)),
            OperatorKind::Neq => Ok(!equals(actual, expected)),
            OperatorKind::Contains => contains(actual, expected),
            OperatorKind::NotContains => self.not_contains(actual, expected),
            OperatorKind::Exists => exists(actual, expected),
            OperatorKind::NotExists => exists(actual, expected).map(|found| !found),
            OperatorKind::Matches => matches(actual, comparison),
            OperatorKind::NotMatches => matches(actual, comparison).map(|found| !found),
        };

        match outcome {
            Ok(result) => (result, None),
            Err(message) => {
                tracing::debug!(
                    key,
                    operator = %operator,
                    error = %message,
                    "leaf evaluation failed"
                );
                (false, Some(message))
            }
        }
    }

    /// Evaluate a condition, collecting every leaf error in order.
    ///
    /// All leaves are evaluated even when an earlier one already decides
    /// the result.
    pub fn evaluate_condition(
        &self,
        condition: &Condition,
        attributes: &AttributeValue,
    ) -> (bool, Vec<String>) {
        let combinator = match condition {
            Condition::Comparison(leaf) => {
                let (result, error) = self.evaluate_leaf(leaf, attributes);
                return (result, error.into_iter().collect());
            }
            Condition::Combinator(combinator) => combinator,
        };

        let kind = match &combinator.operator {
            Some(CombinatorOperator::Known(kind)) => *kind,
            Some(CombinatorOperator::Unknown(_)) | None => {
                return (false, vec![INVALID_CONDITION_OPERATOR.to_string()]);
            }
        };

        let mut results = Vec::with_capacity(combinator.rules.len());
        let mut errors = Vec::new();
        for leaf in &combinator.rules {
            let (result, error) = self.evaluate_leaf(leaf, attributes);
            results.push(result);
            errors.extend(error);
        }

        (kind.aggregate(&results), errors)
    }

    fn not_contains(
        &self,
        actual: Option<&AttributeValue>,
        expected: &AttributeValue,
    ) -> Result<bool, String> {
        if actual.is_none() {
            return match self.not_contains_on_missing_key {
                MissingKeyPolicy::Compliant => Ok(true),
                MissingKeyPolicy::NonCompliant => Err(KEY_NOT_FOUND.to_string()),
            };
        }
        contains(actual, expected).map(|found| !found)
    }
}

/// Evaluate one comparison with the default policy.
pub fn evaluate_leaf(
    comparison: &Comparison,
    attributes: &AttributeValue,
) -> (bool, Option<String>) {
    Evaluator::new().evaluate_leaf(comparison, attributes)
}

/// Evaluate a condition with the default policy.
pub fn evaluate_condition(
    condition: &Condition,
    attributes: &AttributeValue,
) -> (bool, Vec<String>) {
    Evaluator::new().evaluate_condition(condition, attributes)
}

fn equals(actual: Option<&AttributeValue>, expected: &AttributeValue) -> bool {
    match actual {
        None => expected.is_null(),
        Some(value) => value.loosely_equals(expected),
    }
}

fn contains(actual: Option<&AttributeValue>, expected: &AttributeValue) -> Result<bool, String> {
    let Some(actual) = actual else {
        return Err(KEY_NOT_FOUND.to_string());
    };
    match actual {
        AttributeValue::String(haystack) => match expected {
            AttributeValue::String(needle) => Ok(haystack.contains(needle.as_str())),
            other => Err(format!(
                "contains on a string attribute expects a string value, got {}",
                other.kind()
            )),
        },
        AttributeValue::Sequence(items) => {
            Ok(items.iter().any(|item| item.loosely_equals(expected)))
        }
        AttributeValue::Mapping(map) => match expected {
            AttributeValue::String(key) => Ok(map.contains_key(key)),
            other => Err(format!(
                "contains on a mapping attribute expects a string key, got {}",
                other.kind()
            )),
        },
        other => Err(format!(
            "contains is not supported on a {} attribute",
            other.kind()
        )),
    }
}

fn exists(actual: Option<&AttributeValue>, expected: &AttributeValue) -> Result<bool, String> {
    let Some(wanted) = expected.as_bool() else {
        return Err(format!(
            "exists expects a boolean value, got {}",
            expected.kind()
        ));
    };
    let present = match actual {
        None => false,
        Some(AttributeValue::String(_)) => true,
        Some(value) => value.is_truthy(),
    };
    Ok(present == wanted)
}

fn matches(actual: Option<&AttributeValue>, comparison: &Comparison) -> Result<bool, String> {
    let expected = &comparison.value;
    let Some(source) = expected.as_str() else {
        return Err(format!(
            "matches expects a string pattern, got {}",
            expected.kind()
        ));
    };
    let compiled;
    let pattern = match comparison.compiled_pattern() {
        Some(cached) => cached,
        None => {
            compiled = AnchoredPattern::compile(source);
            &compiled
        }
    };
    let regex = pattern.regex().map_err(str::to_string)?;
    Ok(regex.is_match(&match_subject(actual)))
}

/// String form an attribute is matched in. Booleans are `True` / `False`
/// and null or absent values are [`ABSENT_STRING_FORM`], so patterns written
/// for the rule tables keep matching. Everything else uses `Display`.
fn match_subject(actual: Option<&AttributeValue>) -> String {
    match actual {
        None | Some(AttributeValue::Null) => ABSENT_STRING_FORM.to_string(),
        Some(AttributeValue::Bool(true)) => "True".to_string(),
        Some(AttributeValue::Bool(false)) => "False".to_string(),
        Some(value) => value.to_string(),
    }
}
