//! # State Documents
//!
//! Only the parts of a Terraform state the checker reads are modelled.
//! Unknown fields are ignored, so state files from any Terraform version
//! with a top-level `resources` list decode.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tfcc_core::AttributeValue;

use crate::error::StateError;

/// A decoded Terraform state document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    /// State format version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terraform_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineage: Option<String>,
    pub resources: Vec<ResourceRecord>,
}

impl StateDocument {
    pub fn from_json(s: &str) -> Result<Self, StateError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Total number of instances across all resource records.
    pub fn instance_count(&self) -> usize {
        self.resources.iter().map(|r| r.instances.len()).sum()
    }
}

/// One top-level resource record.
///
/// `type` and `provider` are optional here so that a record lacking them
/// can be reported by position when the index is built.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceRecord {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub instances: Vec<ResourceInstance>,
}

/// One instance of a resource (several with `count` or `for_each`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceInstance {
    #[serde(default = "empty_attributes")]
    pub attributes: AttributeValue,
}

impl Default for ResourceInstance {
    fn default() -> Self {
        Self {
            attributes: empty_attributes(),
        }
    }
}

fn empty_attributes() -> AttributeValue {
    AttributeValue::Mapping(BTreeMap::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_state_with_metadata() {
        let doc = StateDocument::from_json(
            r#"{
                "version": 4,
                "terraform_version": "1.6.2",
                "serial": 12,
                "lineage": "3f1c0b7e",
                "outputs": {},
                "resources": [{
                    "mode": "managed",
                    "type": "aws_s3_bucket",
                    "name": "logs",
                    "provider": "provider[\"registry.terraform.io/hashicorp/aws\"]",
                    "instances": [{"schema_version": 0, "attributes": {"id": "logs"}}]
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.version, Some(4));
        assert_eq!(doc.terraform_version.as_deref(), Some("1.6.2"));
        assert_eq!(doc.resources[0].resource_type.as_deref(), Some("aws_s3_bucket"));
        assert_eq!(doc.instance_count(), 1);
    }

    #[test]
    fn missing_resources_is_a_decode_error() {
        let err = StateDocument::from_json(r#"{"version": 4}"#).unwrap_err();
        assert!(matches!(err, StateError::Decode(_)));
    }

    #[test]
    fn missing_instances_and_attributes_default_to_empty() {
        let doc = StateDocument::from_json(
            r#"{"resources": [
                {"type": "aws_vpc", "provider": "aws"},
                {"type": "aws_subnet", "provider": "aws", "instances": [{}]}
            ]}"#,
        )
        .unwrap();
        assert!(doc.resources[0].instances.is_empty());
        assert_eq!(
            doc.resources[1].instances[0].attributes,
            AttributeValue::Mapping(BTreeMap::new())
        );
    }
}
