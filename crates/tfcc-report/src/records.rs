//! # Result Records
//!
//! `tfcc check` writes one workspace's verdicts to
//! `<entity>/<workspace>/results.json` as a JSON list of per-rule verdict
//! lists. Reports are folded from those files, so decoding here is the
//! boundary where a hand-edited or foreign file is caught: every record's
//! `compliance_status` must be a JSON boolean.

use std::path::{Path, PathBuf};

use serde_json::Value;

use tfcc_core::Verdict;

use crate::error::ReportError;

/// File name of a workspace's result records.
pub const RESULTS_FILE_NAME: &str = "results.json";

/// Where a workspace's result records live, relative to a results root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultKey {
    pub entity: String,
    pub workspace: String,
}

impl ResultKey {
    pub fn new(entity: impl Into<String>, workspace: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            workspace: workspace.into(),
        }
    }

    /// Parse `<entity>/<workspace>/results.json`.
    pub fn parse(relative_path: &str) -> Result<Self, ReportError> {
        let invalid = |reason: &str| ReportError::InvalidResultKey {
            path: relative_path.to_string(),
            reason: reason.to_string(),
        };
        match relative_path.split('/').collect::<Vec<_>>().as_slice() {
            [entity, workspace, file] if *file == RESULTS_FILE_NAME => {
                if entity.is_empty() || workspace.is_empty() {
                    return Err(invalid("entity and workspace must not be empty"));
                }
                Ok(Self::new(*entity, *workspace))
            }
            [_, _, _] => Err(invalid("result files must be named results.json")),
            _ => Err(invalid("expected <entity>/<workspace>/results.json")),
        }
    }

    /// Path of the results file below `root`.
    pub fn path_in(&self, root: &Path) -> PathBuf {
        root.join(&self.entity)
            .join(&self.workspace)
            .join(RESULTS_FILE_NAME)
    }
}

impl std::fmt::Display for ResultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.entity, self.workspace, RESULTS_FILE_NAME)
    }
}

/// Decode a results file into a flat verdict list.
///
/// Accepts a list of per-rule verdict lists, or a flat list of verdicts.
/// A record whose `compliance_status` is missing or not a boolean aborts
/// decoding with [`ReportError::InvalidComplianceStatus`].
pub fn decode_verdicts(json: &str) -> Result<Vec<Verdict>, ReportError> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(items) = value else {
        return Err(ReportError::Decode(serde::de::Error::custom(
            "result records must be a JSON list",
        )));
    };

    let mut records = Vec::new();
    for item in items {
        match item {
            Value::Array(rule_records) => records.extend(rule_records),
            record => records.push(record),
        }
    }

    records.into_iter().map(decode_record).collect()
}

fn decode_record(record: Value) -> Result<Verdict, ReportError> {
    if !matches!(record.get("compliance_status"), Some(Value::Bool(_))) {
        let rule_name = record
            .get("rule_name")
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>")
            .to_string();
        tracing::error!(rule = %rule_name, "result record has a non-boolean compliance status");
        return Err(ReportError::InvalidComplianceStatus { rule_name });
    }
    Ok(serde_json::from_value(record)?)
}

/// Encode per-rule verdict lists in the results file layout.
pub fn encode_verdicts(results: &[Vec<Verdict>]) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(results)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(rule: &str, status: Value) -> Value {
        json!({
            "rule_name": rule,
            "description": "",
            "compliance_level": "check",
            "provider": "AWS",
            "resource_type": "aws_s3_bucket",
            "resource_id": "logs",
            "compliance_status": status,
            "errors": []
        })
    }

    #[test]
    fn decodes_nested_and_flat_lists() {
        let nested = json!([
            [record("r1", json!(true)), record("r1", json!(false))],
            [],
            [record("r2", json!(true))]
        ]);
        assert_eq!(decode_verdicts(&nested.to_string()).unwrap().len(), 3);

        let flat = json!([record("r1", json!(true))]);
        assert_eq!(decode_verdicts(&flat.to_string()).unwrap().len(), 1);
    }

    #[test]
    fn non_boolean_status_aborts() {
        for status in [json!("true"), json!(null), json!(1)] {
            let records = json!([[record("r1", json!(true)), record("tls-check", status)]]);
            match decode_verdicts(&records.to_string()) {
                Err(ReportError::InvalidComplianceStatus { rule_name }) => {
                    assert_eq!(rule_name, "tls-check")
                }
                other => panic!("expected invalid status, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_errors_field_defaults_to_empty() {
        let mut rec = record("r1", json!(true));
        rec.as_object_mut().unwrap().remove("errors");
        let verdicts = decode_verdicts(&json!([rec]).to_string()).unwrap();
        assert!(verdicts[0].errors.is_empty());
    }

    #[test]
    fn non_list_document_is_rejected() {
        assert!(matches!(decode_verdicts("{}"), Err(ReportError::Decode(_))));
    }

    #[test]
    fn encoded_results_decode_back() {
        let verdicts = decode_verdicts(&json!([record("r1", json!(true))]).to_string()).unwrap();
        let encoded = encode_verdicts(&[verdicts.clone()]).unwrap();
        assert_eq!(decode_verdicts(&encoded).unwrap(), verdicts);
    }

    #[test]
    fn result_keys() {
        let key = ResultKey::parse("billing/billing-api/results.json").unwrap();
        assert_eq!(key, ResultKey::new("billing", "billing-api"));
        assert_eq!(key.to_string(), "billing/billing-api/results.json");
        assert_eq!(
            key.path_in(Path::new("/tmp/run")),
            PathBuf::from("/tmp/run/billing/billing-api/results.json")
        );
        assert!(ResultKey::parse("billing/billing-api/other.json").is_err());
        assert!(ResultKey::parse("billing/results.json").is_err());
    }
}
