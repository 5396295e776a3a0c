use thiserror::Error;

use tfcc_core::TfccError;

/// Errors raised while decoding or validating rules.
///
/// Evaluation itself does not return errors; see
/// [`Evaluator`](crate::evaluation::Evaluator).
#[derive(Error, Debug)]
pub enum RuleError {
    /// The condition tree or rule record has the wrong shape.
    #[error("malformed rule: {0}")]
    Structural(String),

    /// A named rule could not be decoded.
    #[error("rule {rule_name:?} is invalid: {reason}")]
    InvalidRule {
        /// Name of the offending rule.
        rule_name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A rule key (`ENTITY/PROVIDER/ENV/<name>.json`) is malformed.
    #[error("invalid rule key {key:?}: {reason}")]
    InvalidKey {
        /// The key as given.
        key: String,
        /// What is wrong with it.
        reason: String,
    },

    /// JSON decoding failed.
    #[error("rule decoding failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// A core value failed to parse.
    #[error(transparent)]
    Core(#[from] TfccError),
}
