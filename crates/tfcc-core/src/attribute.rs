//! # Attribute Trees and Path Resolution
//!
//! Every resource instance in a Terraform state document carries an
//! arbitrary attribute tree. [`AttributeValue`] is the closed, tagged
//! representation of that tree, and [`AttributeValue::resolve()`] walks a
//! dotted/indexed path such as `tags.env` or `ingress.0.cidr_blocks.1`
//! through it.
//!
//! ## Resolution Rules
//!
//! - The path is split on `.`; the first segment is looked up on the root
//!   mapping.
//! - A sequence is indexed by a segment made only of ASCII digits that is in
//!   bounds.
//! - A mapping is indexed by key.
//! - Anything else (scalar, missing key, out-of-bounds index, non-numeric
//!   segment on a sequence) resolves to `None` and the walk stops.
//!
//! An explicit `null` stored in the tree resolves to `None` as well. Existing
//! rule sets use `eq null` to match a missing key, so absent and null stay
//! indistinguishable.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TfccError;

/// A node in a resource attribute tree.
///
/// Serializes to and from plain JSON; the tag is the JSON shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum AttributeValue {
    /// JSON `null`.
    #[default]
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number (integer or float, as decoded).
    Number(serde_json::Number),
    /// JSON string.
    String(String),
    /// Ordered JSON array.
    Sequence(Vec<AttributeValue>),
    /// JSON object, keys in sorted order.
    Mapping(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Decode an attribute tree from a JSON string.
    pub fn from_json(s: &str) -> Result<Self, TfccError> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        Ok(value.into())
    }

    /// Short name of the variant, used in evaluation error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Truthiness: empty containers, empty strings, zero, `false` and
    /// `null` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
            Self::String(s) => !s.is_empty(),
            Self::Sequence(items) => !items.is_empty(),
            Self::Mapping(map) => !map.is_empty(),
        }
    }

    /// Look up a key on a mapping node. Non-mappings have no keys.
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        match self {
            Self::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Resolve a dotted/indexed path against this tree.
    ///
    /// Returns `None` when any segment misses; see the module docs for the
    /// exact rules.
    pub fn resolve(&self, path: &str) -> Option<&AttributeValue> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.get(first)?;

        for segment in segments {
            current = match current {
                Self::Sequence(items) => items.get(parse_index(segment)?)?,
                Self::Mapping(map) => map.get(segment)?,
                _ => return None,
            };
            if current.is_null() {
                return None;
            }
        }

        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    /// Numeric-aware equality: `1` and `1.0` compare equal, containers
    /// compare element-wise with the same rule.
    pub fn loosely_equals(&self, other: &AttributeValue) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => a == b,
            },
            (Self::Sequence(a), Self::Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loosely_equals(y))
            }
            (Self::Mapping(a), Self::Mapping(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .all(|(k, v)| b.get(k).map_or(false, |w| v.loosely_equals(w)))
            }
            _ => self == other,
        }
    }
}

/// A sequence index must be a plain run of ASCII digits (no sign, no
/// whitespace).
fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

impl From<serde_json::Value> for AttributeValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Mapping(
                map.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
            ),
        }
    }
}

impl From<AttributeValue> for serde_json::Value {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::Null => Self::Null,
            AttributeValue::Bool(b) => Self::Bool(b),
            AttributeValue::Number(n) => Self::Number(n),
            AttributeValue::String(s) => Self::String(s),
            AttributeValue::Sequence(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            AttributeValue::Mapping(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

/// String form of a value: strings are written raw, everything else as
/// compact JSON.
impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            other => {
                let json = serde_json::Value::from(other.clone());
                write!(f, "{json}")
            }
        }
    }
}
