use thiserror::Error;

/// Errors raised while decoding or indexing a state document.
#[derive(Error, Debug)]
pub enum StateError {
    /// The document is not valid JSON or lacks the `resources` list.
    #[error("state document could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    /// A resource record is missing a field the index keys on.
    #[error("resource record #{position} is malformed: missing {field}")]
    MalformedResource {
        /// Zero-based position of the record in `resources`.
        position: usize,
        /// The missing field, `type` or `provider`.
        field: &'static str,
    },
}
