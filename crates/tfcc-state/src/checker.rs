//! # Compliance Checker
//!
//! Applies rules to the instances in a [`ResourceIndex`].
//!
//! Every instance of every resource in the rule's bucket gets its own
//! verdict: a resource created with `count = 3` yields three verdicts, not
//! one for its last instance.

use rayon::prelude::*;

use tfcc_core::{AttributeValue, ResourceId, Verdict, NO_ID_FOUND};
use tfcc_rules::{Evaluator, Rule};

use crate::index::ResourceIndex;

/// Apply one rule to every matching instance.
///
/// A rule whose provider/resource type is not in the index is not
/// applicable and yields no verdicts.
pub fn apply_rule(rule: &Rule, index: &ResourceIndex, evaluator: &Evaluator) -> Vec<Verdict> {
    let Some(resources) = index.bucket(&rule.provider, &rule.resource_type) else {
        tracing::debug!(
            rule = %rule.rule_name,
            provider = %rule.provider,
            resource_type = %rule.resource_type,
            "no matching resources, rule not applicable"
        );
        return Vec::new();
    };

    let verdicts: Vec<Verdict> = resources
        .iter()
        .flat_map(|resource| resource.instances.iter())
        .map(|instance| {
            let (compliance_status, errors) =
                evaluator.evaluate_condition(&rule.condition, &instance.attributes);
            Verdict {
                rule_name: rule.rule_name.clone(),
                description: rule.description.clone(),
                compliance_level: rule.compliance_level,
                provider: rule.provider.clone(),
                resource_type: rule.resource_type.clone(),
                resource_id: ResourceId::Single(instance_id(&instance.attributes)),
                compliance_status,
                errors,
            }
        })
        .collect();

    tracing::debug!(
        rule = %rule.rule_name,
        verdicts = verdicts.len(),
        failed = verdicts.iter().filter(|v| !v.compliance_status).count(),
        "applied rule"
    );
    verdicts
}

/// Apply a rule set to one workspace's index. Returns one verdict list per
/// rule, in rule order.
pub fn evaluate_workspace(
    rules: &[Rule],
    index: &ResourceIndex,
    evaluator: &Evaluator,
) -> Vec<Vec<Verdict>> {
    rules
        .par_iter()
        .map(|rule| apply_rule(rule, index, evaluator))
        .collect()
}

/// The instance's `id` attribute as a string, or [`NO_ID_FOUND`].
fn instance_id(attributes: &AttributeValue) -> String {
    match attributes.resolve("id") {
        Some(AttributeValue::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => NO_ID_FOUND.to_string(),
    }
}
