//! # Temporal Types — Report Run Timestamps
//!
//! Defines `RunTimestamp`, a UTC-only timestamp truncated to seconds that
//! labels one compliance run. Result files and reports for a run are keyed
//! by its label, e.g. `2023-06-19-15-22-50/<entity>/<workspace>/results.json`.
//!
//! ## Formats
//!
//! - Label form (`Display`, serde): `YYYY-MM-DD-HH-MM-SS`.
//! - [`RunTimestamp::parse()`] also accepts RFC 3339 with a `Z` suffix, for
//!   callers that pass ISO timestamps on the command line.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TfccError;

/// Label format of a run timestamp.
pub const RUN_LABEL_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// A UTC-only run timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunTimestamp(DateTime<Utc>);

impl RunTimestamp {
    /// Current UTC time, truncated.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// From a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt.with_nanosecond(0).unwrap_or(dt))
    }

    /// Parse either a run label (`2023-06-19-15-22-50`) or an RFC 3339
    /// timestamp with a `Z` suffix.
    ///
    /// # Errors
    ///
    /// Returns [`TfccError::InvalidTimestamp`] if the string matches
    /// neither form, or uses a non-UTC offset.
    pub fn parse(s: &str) -> Result<Self, TfccError> {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, RUN_LABEL_FORMAT) {
            return Ok(Self::from_utc(naive.and_utc()));
        }

        if !s.ends_with('Z') {
            return Err(TfccError::InvalidTimestamp(format!(
                "expected YYYY-MM-DD-HH-MM-SS or an RFC 3339 UTC timestamp, got {s:?}"
            )));
        }

        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| TfccError::InvalidTimestamp(format!("{s:?}: {e}")))?;
        Ok(Self::from_utc(dt.with_timezone(&Utc)))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// The `YYYY-MM-DD-HH-MM-SS` label.
    pub fn to_label(&self) -> String {
        self.0.format(RUN_LABEL_FORMAT).to_string()
    }
}

impl std::fmt::Display for RunTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(RUN_LABEL_FORMAT))
    }
}

impl std::str::FromStr for RunTimestamp {
    type Err = TfccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for RunTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_label())
    }
}

impl<'de> Deserialize<'de> for RunTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
