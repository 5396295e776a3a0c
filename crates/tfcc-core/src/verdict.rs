//! # Verdicts
//!
//! A [`Verdict`] is the outcome of applying one rule to one resource
//! instance. Verdicts are produced by the checker and folded into workspace
//! reports, where verdicts of the same identity class
//! (`rule_name`, `resource_type`, `provider`) are merged and their resource
//! ids accumulated into a set.

use serde::{Deserialize, Serialize};

use crate::level::ComplianceLevel;
use crate::provider::ProviderName;

/// Resource id used when an instance has no `id` attribute.
pub const NO_ID_FOUND: &str = "no id found";

/// One resource identifier, or the accumulated identifiers of a merged
/// report entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Single(String),
    Many(Vec<String>),
}

impl ResourceId {
    /// All identifiers, in insertion order.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Self::Single(id) => vec![id.as_str()],
            Self::Many(ids) => ids.iter().map(String::as_str).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert to the set form, keeping the identifiers.
    pub fn into_set(self) -> Self {
        match self {
            Self::Single(id) => Self::Many(vec![id]),
            many @ Self::Many(_) => many,
        }
    }

    /// Union `other` into `self`. Identifiers already present are not
    /// added twice; insertion order is kept.
    pub fn union(&mut self, other: ResourceId) {
        let mut merged = match std::mem::replace(self, Self::Many(Vec::new())) {
            Self::Single(id) => vec![id],
            Self::Many(ids) => ids,
        };
        let incoming = match other {
            Self::Single(id) => vec![id],
            Self::Many(ids) => ids,
        };
        for id in incoming {
            if !merged.contains(&id) {
                merged.push(id);
            }
        }
        *self = Self::Many(merged);
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.ids().join(", "))
    }
}

/// Outcome of one rule against one resource instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub rule_name: String,
    pub description: String,
    pub compliance_level: ComplianceLevel,
    pub provider: ProviderName,
    pub resource_type: String,
    pub resource_id: ResourceId,
    pub compliance_status: bool,
    /// Non-empty error messages from the condition's leaves, in order.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl Verdict {
    /// Whether `other` belongs to the same identity class
    /// (`rule_name`, `resource_type`, `provider`).
    pub fn same_identity(&self, other: &Verdict) -> bool {
        self.rule_name == other.rule_name
            && self.resource_type == other.resource_type
            && self.provider == other.provider
    }
}
