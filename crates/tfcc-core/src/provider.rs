//! # Provider Names
//!
//! Terraform state records name their provider with a full registry
//! address, usually wrapped in the `provider["..."]` form:
//!
//! ```text
//! provider["registry.terraform.io/hashicorp/aws"]
//! provider["registry.terraform.io/hashicorp/aws"].west
//! registry.terraform.io/hashicorp/azurerm
//! ```
//!
//! Rules and index keys use the short upper-case name (`AWS`, `AZURERM`).
//! [`ProviderName`] is that short name; it can only be produced by
//! [`normalize_provider()`], so raw addresses and short names cannot be
//! mixed up.

use serde::{Deserialize, Serialize};

/// Normalized, upper-case provider name (e.g. `AWS`).
///
/// Deserialization normalizes too, so a verdict or rule decoded from disk
/// holds the short form even if the file carried a registry address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ProviderName(String);

impl ProviderName {
    /// Normalize a raw provider identifier. Equivalent to
    /// [`normalize_provider()`].
    pub fn from_raw(raw: &str) -> Self {
        normalize_provider(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ProviderName {
    fn from(raw: String) -> Self {
        normalize_provider(&raw)
    }
}

impl From<ProviderName> for String {
    fn from(name: ProviderName) -> Self {
        name.0
    }
}

impl std::fmt::Display for ProviderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for ProviderName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ProviderName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Extract the short provider name from a raw identifier.
///
/// When the identifier contains at least two double quotes, only the text
/// between the first and the last quote is considered. That text (or the
/// whole identifier when unquoted) is split on `/` and the last segment is
/// upper-cased.
pub fn normalize_provider(raw: &str) -> ProviderName {
    let inner = match (raw.find('"'), raw.rfind('"')) {
        (Some(start), Some(end)) if start < end => &raw[start + 1..end],
        _ => raw,
    };
    let last = inner.rsplit('/').next().unwrap_or(inner);
    ProviderName(last.trim().to_uppercase())
}
