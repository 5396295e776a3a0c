//! # Rule Document Validation
//!
//! Authored rules live in a directory tree keyed as
//! `ENTITY/PROVIDER/ENV/<rule_name>.json`, with `ENV` one of `DEV`, `QA`,
//! `PROD` or `ALL`. [`RuleKey`] parses that relative path and
//! [`validate_rule_document`] checks a document against its key before it
//! is admitted to a catalog.
//!
//! Validation reports every problem it finds rather than stopping at the
//! first, so `tfcc rules validate` can print a complete list.

use serde::Serialize;
use serde_json::Value;

use tfcc_core::{normalize_provider, ComplianceLevel};

use crate::condition::{CombinatorOperator, Condition, LeafOperator};
use crate::error::RuleError;

/// Environment segments accepted in a rule key.
pub const RULE_ENVIRONMENTS: &[&str] = &["DEV", "QA", "PROD", "ALL"];

/// Environment segment that applies a rule to every environment.
pub const ALL_ENVIRONMENTS: &str = "ALL";

/// Entity segment that applies a rule to every entity.
pub const ALL_ENTITIES: &str = "ALL";

/// Fields every rule document must carry.
pub const REQUIRED_FIELDS: &[&str] = &[
    "provider",
    "resource_type",
    "description",
    "compliance_level",
    "condition",
];

/// Location of a rule document, parsed from its relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RuleKey {
    pub entity: String,
    pub provider: String,
    pub environment: String,
    pub rule_name: String,
}

impl RuleKey {
    /// Parse `ENTITY/PROVIDER/ENV/<rule_name>.json`.
    pub fn parse(relative_path: &str) -> Result<Self, RuleError> {
        let invalid = |reason: &str| RuleError::InvalidKey {
            key: relative_path.to_string(),
            reason: reason.to_string(),
        };

        let segments: Vec<&str> = relative_path.split('/').collect();
        let [entity, provider, environment, file_name] = segments.as_slice() else {
            return Err(invalid(
                "expected exactly four segments ENTITY/PROVIDER/ENV/<name>.json",
            ));
        };
        let Some(rule_name) = file_name.strip_suffix(".json") else {
            return Err(invalid("rule documents must be .json files"));
        };
        if !RULE_ENVIRONMENTS.contains(environment) {
            return Err(invalid("environment must be one of DEV, QA, PROD, ALL"));
        }
        if entity.is_empty() || provider.is_empty() || rule_name.is_empty() {
            return Err(invalid("entity, provider and rule name must not be empty"));
        }

        Ok(Self {
            entity: entity.to_string(),
            provider: provider.to_string(),
            environment: environment.to_string(),
            rule_name: rule_name.to_string(),
        })
    }

    /// Whether a rule stored under this key applies to a workspace of the
    /// given entity and environment. `ALL` in either segment matches
    /// everything.
    pub fn applies_to(&self, entity: &str, environment: &str) -> bool {
        self.matches_entity(entity) && self.matches_environment(environment)
    }

    /// Org-wide rules live under the `ALL` entity.
    pub fn matches_entity(&self, entity: &str) -> bool {
        self.entity == ALL_ENTITIES || self.entity.eq_ignore_ascii_case(entity)
    }

    pub fn matches_environment(&self, environment: &str) -> bool {
        self.environment == ALL_ENVIRONMENTS || self.environment.eq_ignore_ascii_case(environment)
    }
}

impl std::fmt::Display for RuleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}.json",
            self.entity, self.provider, self.environment, self.rule_name
        )
    }
}

/// One problem found in a rule document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleIssue {
    pub field: String,
    pub message: String,
}

impl RuleIssue {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RuleIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check an authored rule document against its key. An empty result means
/// the document is admissible.
pub fn validate_rule_document(doc: &Value, key: &RuleKey) -> Vec<RuleIssue> {
    let Value::Object(fields) = doc else {
        return vec![RuleIssue::new("document", "rule document must be a JSON object")];
    };

    let mut issues: Vec<RuleIssue> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !fields.contains_key(**field))
        .map(|field| RuleIssue::new(field, "missing required field"))
        .collect();

    for field in ["provider", "resource_type", "description", "compliance_level"] {
        if let Some(value) = fields.get(field) {
            if !value.is_string() {
                issues.push(RuleIssue::new(field, "must be a string"));
            }
        }
    }

    if let Some(provider) = fields.get("provider").and_then(Value::as_str) {
        let normalized = normalize_provider(provider);
        if normalized.as_str() != key.provider {
            issues.push(RuleIssue::new(
                "provider",
                format!(
                    "provider {normalized} does not match key provider {}",
                    key.provider
                ),
            ));
        }
    }

    if let Some(level) = fields.get("compliance_level").and_then(Value::as_str) {
        if level.parse::<ComplianceLevel>().is_err() {
            let allowed: Vec<&str> = ComplianceLevel::all_levels()
                .iter()
                .map(ComplianceLevel::as_str)
                .collect();
            issues.push(RuleIssue::new(
                "compliance_level",
                format!("{level:?} must be one of {}", allowed.join(", ")),
            ));
        }
    }

    if let Some(condition) = fields.get("condition") {
        issues.extend(validate_condition(condition));
    }

    issues
}

fn validate_condition(condition: &Value) -> Vec<RuleIssue> {
    let decoded = match condition {
        Value::String(text) => Condition::from_json(text),
        other => Condition::try_from(other.clone()),
    };
    let condition = match decoded {
        Ok(condition) => condition,
        Err(e) => return vec![RuleIssue::new("condition", e.to_string())],
    };

    let mut issues = Vec::new();
    if let Condition::Combinator(combinator) = &condition {
        match &combinator.operator {
            None => {
                issues.push(RuleIssue::new("condition.operator", "combinator needs an operator"))
            }
            Some(CombinatorOperator::Unknown(name)) => issues.push(RuleIssue::new(
                "condition.operator",
                format!("unknown condition operator {name:?}"),
            )),
            Some(_) => {}
        }
    }

    let prefix = matches!(condition, Condition::Combinator(_));
    for (index, leaf) in condition.comparisons().iter().enumerate() {
        let field = if prefix {
            format!("condition.rules[{index}]")
        } else {
            "condition".to_string()
        };
        if leaf.key.as_deref().map_or(true, str::is_empty) {
            issues.push(RuleIssue::new(&field, "comparison needs a key"));
        }
        match &leaf.operator {
            None => issues.push(RuleIssue::new(&field, "comparison needs an operator")),
            Some(LeafOperator::Unknown(name)) => {
                issues.push(RuleIssue::new(&field, format!("unknown operator {name:?}")))
            }
            Some(LeafOperator::Known(_)) => {}
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key() -> RuleKey {
        RuleKey::parse("platform/AWS/PROD/s3-versioning.json").unwrap()
    }

    fn document() -> Value {
        json!({
            "provider": "registry.terraform.io/hashicorp/aws",
            "resource_type": "aws_s3_bucket",
            "description": "Versioning is enabled",
            "compliance_level": "hard_mandatory",
            "condition": {"operator": "and", "rules": [
                {"key": "versioning.0.enabled", "operator": "eq", "value": true}
            ]}
        })
    }

    #[test]
    fn parses_rule_key() {
        let key = key();
        assert_eq!(key.entity, "platform");
        assert_eq!(key.provider, "AWS");
        assert_eq!(key.environment, "PROD");
        assert_eq!(key.rule_name, "s3-versioning");
        assert_eq!(key.to_string(), "platform/AWS/PROD/s3-versioning.json");
    }

    #[test]
    fn rejects_bad_rule_keys() {
        for bad in [
            "AWS/PROD/rule.json",
            "platform/AWS/PROD/extra/rule.json",
            "platform/AWS/PROD/rule.yaml",
            "platform/AWS/STAGING/rule.json",
            "platform/AWS/prod/rule.json",
            "platform/AWS/PROD/.json",
        ] {
            assert!(
                matches!(RuleKey::parse(bad), Err(RuleError::InvalidKey { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn all_environment_applies_everywhere() {
        let key = RuleKey::parse("platform/AWS/ALL/r.json").unwrap();
        assert!(key.applies_to("platform", "dev"));
        assert!(key.applies_to("platform", "prod"));
        assert!(!key.applies_to("payments", "prod"));

        let prod = RuleKey::parse("platform/AWS/PROD/r.json").unwrap();
        assert!(prod.applies_to("platform", "prod"));
        assert!(!prod.applies_to("platform", "qa"));
    }

    #[test]
    fn all_entity_applies_to_every_entity() {
        let org_wide = RuleKey::parse("ALL/AWS/ALL/r.json").unwrap();
        assert!(org_wide.applies_to("platform", "prod"));
        assert!(org_wide.applies_to("billing", "dev"));

        let org_prod = RuleKey::parse("ALL/AWS/PROD/r.json").unwrap();
        assert!(org_prod.applies_to("platform", "prod"));
        assert!(!org_prod.applies_to("platform", "dev"));

        let lower = RuleKey::parse("all/AWS/PROD/r.json").unwrap();
        assert!(!lower.applies_to("platform", "prod"));
        assert!(lower.applies_to("ALL", "prod"));
    }

    #[test]
    fn valid_document_has_no_issues() {
        assert!(validate_rule_document(&document(), &key()).is_empty());
    }

    #[test]
    fn encoded_condition_is_accepted() {
        let mut doc = document();
        doc["condition"] = json!(doc["condition"].to_string());
        assert!(validate_rule_document(&doc, &key()).is_empty());
    }

    #[test]
    fn reports_every_missing_field() {
        let issues = validate_rule_document(&json!({"provider": "aws"}), &key());
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["resource_type", "description", "compliance_level", "condition"]
        );
    }

    #[test]
    fn provider_must_match_key() {
        let mut doc = document();
        doc["provider"] = json!("hashicorp/azurerm");
        let issues = validate_rule_document(&doc, &key());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "provider");
        assert!(issues[0].message.contains("AZURERM"));
    }

    #[test]
    fn compliance_level_must_be_known() {
        let mut doc = document();
        doc["compliance_level"] = json!("advisory");
        let issues = validate_rule_document(&doc, &key());
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("hard_mandatory"));
    }

    #[test]
    fn combinator_needs_operator() {
        let mut doc = document();
        doc["condition"] = json!({"rules": [
            {"key": "a", "operator": "eq", "value": 1},
            {"key": "b", "operator": "eq", "value": 2}
        ]});
        let issues = validate_rule_document(&doc, &key());
        assert_eq!(
            issues,
            vec![RuleIssue::new("condition.operator", "combinator needs an operator")]
        );
    }

    #[test]
    fn leaves_need_key_and_known_operator() {
        let mut doc = document();
        doc["condition"] = json!({"operator": "or", "rules": [
            {"operator": "eq", "value": 1},
            {"key": "b", "operator": "greater_than", "value": 2}
        ]});
        let issues = validate_rule_document(&doc, &key());
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["condition.rules[0]", "condition.rules[1]"]);
    }

    #[test]
    fn nested_combinator_is_reported() {
        let mut doc = document();
        doc["condition"] = json!({"operator": "or", "rules": [
            {"operator": "and", "rules": []}
        ]});
        let issues = validate_rule_document(&doc, &key());
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("nested combinators"));
    }
}
