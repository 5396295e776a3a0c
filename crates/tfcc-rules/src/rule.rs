//! # Rules
//!
//! A [`Rule`] scopes a [`Condition`] to one provider and resource type and
//! carries the metadata copied onto every verdict it produces.
//!
//! Rules arrive in three shapes, all decoded here:
//!
//! - [`RuleSource`]: a complete record with `rule_name`. The rule-table
//!   record shape (`RuleName`, `Description`, `ComplianceLevel`, `Provider`,
//!   `ResourceType`, `Rule`) is accepted through serde aliases.
//! - [`RuleDocument`]: an authored rule file. Its name comes from the file
//!   name, see [`RuleDocument::into_source`].
//! - A JSON list of rule sources ([`Rule::list_from_json`]).
//!
//! In every shape the condition may be inline JSON or a JSON-encoded string.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use tfcc_core::{normalize_provider, ComplianceLevel, ProviderName};

use crate::condition::Condition;
use crate::error::RuleError;

/// A condition as it appears in a rule record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionSource {
    /// JSON text, as stored in rule tables.
    Encoded(String),
    /// An inline JSON object.
    Inline(Value),
}

impl ConditionSource {
    pub fn decode(&self) -> Result<Condition, RuleError> {
        match self {
            Self::Encoded(text) => Condition::from_json(text),
            Self::Inline(value) => Condition::try_from(value.clone()),
        }
    }
}

/// An undecoded rule record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSource {
    #[serde(alias = "RuleName")]
    pub rule_name: String,
    #[serde(alias = "Description", default)]
    pub description: String,
    #[serde(alias = "Provider")]
    pub provider: String,
    #[serde(alias = "ResourceType")]
    pub resource_type: String,
    #[serde(alias = "ComplianceLevel")]
    pub compliance_level: String,
    #[serde(alias = "Rule")]
    pub condition: ConditionSource,
}

/// An authored rule file: everything but the name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    pub provider: String,
    pub resource_type: String,
    pub description: String,
    pub compliance_level: String,
    pub condition: ConditionSource,
}

impl RuleDocument {
    pub fn from_json(s: &str) -> Result<Self, RuleError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn into_source(self, rule_name: impl Into<String>) -> RuleSource {
        RuleSource {
            rule_name: rule_name.into(),
            description: self.description,
            provider: self.provider,
            resource_type: self.resource_type,
            compliance_level: self.compliance_level,
            condition: self.condition,
        }
    }
}

/// A decoded, immutable rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RuleSource")]
pub struct Rule {
    pub rule_name: String,
    pub description: String,
    pub provider: ProviderName,
    pub resource_type: String,
    pub compliance_level: ComplianceLevel,
    pub condition: Condition,
}

impl Rule {
    /// Decode a rule source. The provider is normalized, so both `aws` and
    /// `registry.terraform.io/hashicorp/aws` yield `AWS`.
    pub fn from_source(source: RuleSource) -> Result<Self, RuleError> {
        let invalid = |reason: String| RuleError::InvalidRule {
            rule_name: source.rule_name.clone(),
            reason,
        };

        if source.rule_name.trim().is_empty() {
            return Err(RuleError::Structural("rule_name must not be empty".into()));
        }
        if source.resource_type.trim().is_empty() {
            return Err(invalid("resource_type must not be empty".into()));
        }
        let provider = normalize_provider(&source.provider);
        if provider.as_str().is_empty() {
            return Err(invalid("provider must not be empty".into()));
        }
        let compliance_level: ComplianceLevel = source
            .compliance_level
            .parse()
            .map_err(|e: tfcc_core::TfccError| invalid(e.to_string()))?;
        let condition = source.condition.decode().map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            provider,
            compliance_level,
            condition,
            rule_name: source.rule_name,
            description: source.description,
            resource_type: source.resource_type,
        })
    }

    pub fn from_json(s: &str) -> Result<Self, RuleError> {
        let source: RuleSource = serde_json::from_str(s)?;
        Self::from_source(source)
    }

    /// Decode a JSON list of rule sources. The first bad rule fails the
    /// whole list.
    pub fn list_from_json(s: &str) -> Result<Vec<Self>, RuleError> {
        let sources: Vec<RuleSource> = serde_json::from_str(s)?;
        sources.into_iter().map(Self::from_source).collect()
    }
}

impl TryFrom<RuleSource> for Rule {
    type Error = RuleError;

    fn try_from(source: RuleSource) -> Result<Self, Self::Error> {
        Self::from_source(source)
    }
}
