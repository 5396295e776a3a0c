//! # Resource Index
//!
//! Groups a state document's resource records by normalized provider and
//! resource type:
//!
//! ```text
//! AWS
//! ├── aws_s3_bucket      [logs, assets]
//! └── aws_security_group [web]
//! AZURERM
//! └── azurerm_storage_account [main]
//! ```
//!
//! Raw provider strings that normalize to the same name (aliased providers
//! such as `provider["registry.terraform.io/hashicorp/aws"].west`) share one
//! bucket. Records keep their document order inside a bucket.

use std::collections::BTreeMap;

use tfcc_core::{normalize_provider, ProviderName};

use crate::document::{ResourceRecord, StateDocument};
use crate::error::StateError;

type TypeBuckets = BTreeMap<String, Vec<ResourceRecord>>;

/// Resource records keyed by provider, then resource type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceIndex {
    providers: BTreeMap<ProviderName, TypeBuckets>,
}

impl ResourceIndex {
    /// Records of one provider and resource type, in document order.
    pub fn bucket(
        &self,
        provider: &ProviderName,
        resource_type: &str,
    ) -> Option<&[ResourceRecord]> {
        self.providers
            .get(provider)
            .and_then(|types| types.get(resource_type))
            .map(Vec::as_slice)
    }

    pub fn providers(&self) -> impl Iterator<Item = &ProviderName> {
        self.providers.keys()
    }

    /// Resource types present for a provider, sorted.
    pub fn resource_types(&self, provider: &ProviderName) -> Vec<&str> {
        self.providers
            .get(provider)
            .map(|types| types.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether any record of this provider and resource type exists.
    pub fn contains(&self, provider: &ProviderName, resource_type: &str) -> bool {
        self.bucket(provider, resource_type).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Number of resource records indexed.
    pub fn resource_count(&self) -> usize {
        self.providers
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }
}

/// Index a state document in one pass over its resources.
///
/// Fails on the first record without a `type` or `provider`.
pub fn build_index(document: StateDocument) -> Result<ResourceIndex, StateError> {
    let mut providers: BTreeMap<ProviderName, TypeBuckets> = BTreeMap::new();

    for (position, record) in document.resources.into_iter().enumerate() {
        let resource_type = match record.resource_type.as_deref() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => return Err(StateError::MalformedResource { position, field: "type" }),
        };
        let provider = match record.provider.as_deref() {
            Some(p) if !p.is_empty() => normalize_provider(p),
            _ => {
                return Err(StateError::MalformedResource {
                    position,
                    field: "provider",
                })
            }
        };

        providers
            .entry(provider)
            .or_default()
            .entry(resource_type)
            .or_default()
            .push(record);
    }

    let index = ResourceIndex { providers };
    tracing::debug!(
        providers = index.providers.len(),
        resources = index.resource_count(),
        "built resource index"
    );
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(json: &str) -> StateDocument {
        StateDocument::from_json(json).unwrap()
    }

    #[test]
    fn groups_by_normalized_provider_and_type() {
        let index = build_index(state(
            r#"{"resources": [
                {"type": "aws_s3_bucket", "name": "logs",
                 "provider": "provider[\"registry.terraform.io/hashicorp/aws\"]"},
                {"type": "aws_s3_bucket", "name": "assets",
                 "provider": "provider[\"registry.terraform.io/hashicorp/aws\"]"},
                {"type": "azurerm_storage_account", "name": "main",
                 "provider": "provider[\"registry.terraform.io/hashicorp/azurerm\"]"}
            ]}"#,
        ))
        .unwrap();

        let aws = ProviderName::from_raw("aws");
        let bucket = index.bucket(&aws, "aws_s3_bucket").unwrap();
        let names: Vec<_> = bucket.iter().map(|r| r.name.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["logs", "assets"]);
        assert_eq!(
            index.providers().map(ProviderName::as_str).collect::<Vec<_>>(),
            vec!["AWS", "AZURERM"]
        );
        assert_eq!(index.resource_count(), 3);
    }

    #[test]
    fn aliased_providers_share_a_bucket() {
        let index = build_index(state(
            r#"{"resources": [
                {"type": "aws_s3_bucket", "name": "east",
                 "provider": "provider[\"registry.terraform.io/hashicorp/aws\"]"},
                {"type": "aws_s3_bucket", "name": "west",
                 "provider": "provider[\"registry.terraform.io/hashicorp/aws\"].west"}
            ]}"#,
        ))
        .unwrap();
        let aws = ProviderName::from_raw("aws");
        assert_eq!(index.bucket(&aws, "aws_s3_bucket").unwrap().len(), 2);
    }

    #[test]
    fn missing_type_or_provider_fails_the_build() {
        let err = build_index(state(
            r#"{"resources": [
                {"type": "aws_vpc", "provider": "aws"},
                {"provider": "aws"}
            ]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, StateError::MalformedResource { position: 1, field: "type" }));

        let err = build_index(state(r#"{"resources": [{"type": "aws_vpc"}]}"#)).unwrap_err();
        assert!(matches!(err, StateError::MalformedResource { position: 0, field: "provider" }));
    }

    #[test]
    fn unknown_bucket_is_none() {
        let index = build_index(state(r#"{"resources": []}"#)).unwrap();
        assert!(index.is_empty());
        assert!(index.bucket(&ProviderName::from_raw("aws"), "aws_vpc").is_none());
        assert!(index.resource_types(&ProviderName::from_raw("aws")).is_empty());
    }
}
