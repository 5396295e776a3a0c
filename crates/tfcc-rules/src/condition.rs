//! # Condition Trees
//!
//! A rule's condition is a JSON object of one of two shapes:
//!
//! ```json
//! {"operator": "and", "rules": [
//!     {"key": "tags.env", "operator": "eq", "value": "prod"},
//!     {"key": "acl", "operator": "neq", "value": "public-read"}
//! ]}
//! ```
//!
//! or a single bare comparison `{"key": ..., "operator": ..., "value": ...}`.
//!
//! Exactly one level of nesting is supported: a combinator's children are
//! comparisons. A child carrying its own `rules` list is rejected at decode
//! time.
//!
//! Operator names are parsed into [`LeafOperator`] / [`CombinatorOperator`]
//! when decoding. An unrecognized name is kept as `Unknown` so that
//! evaluation can report it against the one leaf that used it, leaving the
//! sibling leaves unaffected.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tfcc_core::AttributeValue;

use crate::error::RuleError;
use crate::operator::{CombinatorKind, OperatorKind};

/// Operator name of a leaf comparison as written in the rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LeafOperator {
    Known(OperatorKind),
    Unknown(String),
}

impl From<String> for LeafOperator {
    fn from(name: String) -> Self {
        match name.parse() {
            Ok(kind) => Self::Known(kind),
            Err(_) => Self::Unknown(name),
        }
    }
}

impl From<LeafOperator> for String {
    fn from(op: LeafOperator) -> Self {
        match op {
            LeafOperator::Known(kind) => kind.as_str().to_string(),
            LeafOperator::Unknown(name) => name,
        }
    }
}

impl From<OperatorKind> for LeafOperator {
    fn from(kind: OperatorKind) -> Self {
        Self::Known(kind)
    }
}

/// Operator name of a combinator as written in the rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CombinatorOperator {
    Known(CombinatorKind),
    Unknown(String),
}

impl From<String> for CombinatorOperator {
    fn from(name: String) -> Self {
        match name.parse() {
            Ok(kind) => Self::Known(kind),
            Err(_) => Self::Unknown(name),
        }
    }
}

impl From<CombinatorOperator> for String {
    fn from(op: CombinatorOperator) -> Self {
        match op {
            CombinatorOperator::Known(kind) => kind.as_str().to_string(),
            CombinatorOperator::Unknown(name) => name,
        }
    }
}

/// A `matches` pattern compiled once, anchored at the start of the subject.
///
/// A pattern that fails to compile keeps its error message, reported by
/// every evaluation of the leaf.
#[derive(Debug, Clone)]
pub struct AnchoredPattern {
    source: String,
    compiled: Result<Regex, String>,
}

impl AnchoredPattern {
    pub fn compile(source: &str) -> Self {
        let compiled = Regex::new(&format!("^(?:{source})"))
            .map_err(|e| format!("Invalid regular expression {source:?}: {e}"));
        Self {
            source: source.to_string(),
            compiled,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> Result<&Regex, &str> {
        self.compiled.as_ref().map_err(String::as_str)
    }
}

impl PartialEq for AnchoredPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// A leaf rule: compare the attribute at `key` with `value`.
///
/// `key` and `operator` are optional here so that a leaf missing either is
/// still decodable and evaluates to `false` with an "Invalid rule" error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Comparison {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<LeafOperator>,
    pub value: AttributeValue,
    #[serde(skip)]
    pub(crate) pattern: Option<AnchoredPattern>,
}

impl Comparison {
    pub fn new(key: &str, operator: OperatorKind, value: impl Into<AttributeValue>) -> Self {
        Self {
            key: Some(key.to_string()),
            operator: Some(LeafOperator::Known(operator)),
            value: value.into(),
            pattern: None,
        }
        .with_compiled_pattern()
    }

    /// Compile the pattern of a `matches` / `not_matches` leaf so that
    /// evaluation does not recompile it per instance.
    pub fn with_compiled_pattern(mut self) -> Self {
        self.pattern = match (&self.operator, self.value.as_str()) {
            (
                Some(LeafOperator::Known(OperatorKind::Matches | OperatorKind::NotMatches)),
                Some(source),
            ) => Some(AnchoredPattern::compile(source)),
            _ => None,
        };
        self
    }

    /// The compiled pattern, if one was compiled for the current `value`.
    pub fn compiled_pattern(&self) -> Option<&AnchoredPattern> {
        self.pattern
            .as_ref()
            .filter(|pattern| Some(pattern.source()) == self.value.as_str())
    }
}

/// A boolean combination of leaf comparisons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Combinator {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<CombinatorOperator>,
    pub rules: Vec<Comparison>,
}

impl Combinator {
    pub fn new(operator: CombinatorKind, rules: Vec<Comparison>) -> Self {
        Self {
            operator: Some(CombinatorOperator::Known(operator)),
            rules,
        }
    }
}

/// A decoded rule condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, try_from = "serde_json::Value")]
pub enum Condition {
    Combinator(Combinator),
    Comparison(Comparison),
}

impl Condition {
    /// Decode a condition from a JSON-encoded string, as stored in rule
    /// tables.
    pub fn from_json(s: &str) -> Result<Self, RuleError> {
        let value: Value = serde_json::from_str(s)?;
        Self::try_from(value)
    }

    /// The leaves of this condition, in order.
    pub fn comparisons(&self) -> &[Comparison] {
        match self {
            Self::Combinator(c) => &c.rules,
            Self::Comparison(c) => std::slice::from_ref(c),
        }
    }
}

impl TryFrom<Value> for Condition {
    type Error = RuleError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(mut object) = value else {
            return Err(RuleError::Structural(format!(
                "condition must be a JSON object, got {}",
                json_kind(&value)
            )));
        };

        let Some(rules) = object.remove("rules") else {
            if let (None, Some(Value::String(name))) = (object.get("key"), object.get("operator")) {
                if name.parse::<CombinatorKind>().is_ok() {
                    return Err(RuleError::Structural(format!(
                        "combinator {name:?} is missing its `rules` list"
                    )));
                }
            }
            let leaf = decode_comparison(Value::Object(object), None)?;
            return Ok(Self::Comparison(leaf));
        };

        let Value::Array(children) = rules else {
            return Err(RuleError::Structural(format!(
                "condition `rules` must be a list, got {}",
                json_kind(&rules)
            )));
        };

        let operator = match object.remove("operator") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(CombinatorOperator::from(name)),
            Some(other) => Some(CombinatorOperator::Unknown(other.to_string())),
        };

        let rules = children
            .into_iter()
            .enumerate()
            .map(|(index, child)| decode_comparison(child, Some(index)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::Combinator(Combinator { operator, rules }))
    }
}

fn decode_comparison(value: Value, index: Option<usize>) -> Result<Comparison, RuleError> {
    let location = match index {
        Some(i) => format!("rules[{i}]"),
        None => "condition".to_string(),
    };
    match &value {
        Value::Object(object) if object.contains_key("rules") => {
            return Err(RuleError::Structural(format!(
                "{location}: nested combinators are not supported; \
                 a combinator's rules must be comparisons"
            )));
        }
        Value::Object(_) => {}
        other => {
            return Err(RuleError::Structural(format!(
                "{location}: comparison must be a JSON object, got {}",
                json_kind(other)
            )));
        }
    }
    serde_json::from_value::<Comparison>(value)
        .map(Comparison::with_compiled_pattern)
        .map_err(|e| RuleError::Structural(format!("{location}: {e}")))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
