//! Error types used throughout the harness

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ScalePoint;

/// Main error type for Cadence
///
/// Harness failures (`Setup`, `Trial`) wrap the error raised by the user
/// supplied callable together with the run's identifying context.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum CadenceError {
    #[error("setup for '{operation}' failed (trials={trial_count}, scale={scale}): {source}")]
    Setup {
        operation: String,
        trial_count: u32,
        scale: ScalePoint,
        source: Box<CadenceError>,
    },

    #[error(
        "trial {trial}/{trial_count} of '{operation}' failed (scale={scale}): {source}"
    )]
    Trial {
        operation: String,
        trial: u32,
        trial_count: u32,
        scale: ScalePoint,
        source: Box<CadenceError>,
    },

    #[error("Invalid scale: {0}")]
    InvalidScale(String),

    #[error("Reporting error: {0}")]
    Reporting(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CadenceError {
    /// Wrap a setup failure with the context of the run it aborted.
    pub fn setup(
        operation: impl Into<String>,
        trial_count: u32,
        scale: ScalePoint,
        source: CadenceError,
    ) -> Self {
        Self::Setup { operation: operation.into(), trial_count, scale, source: Box::new(source) }
    }

    /// Wrap a trial failure with the context of the run it aborted.
    pub fn trial(
        operation: impl Into<String>,
        trial: u32,
        trial_count: u32,
        scale: ScalePoint,
        source: CadenceError,
    ) -> Self {
        Self::Trial {
            operation: operation.into(),
            trial,
            trial_count,
            scale,
            source: Box::new(source),
        }
    }

    /// Stable label suitable for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Setup { .. } => "setup_failure",
            Self::Trial { .. } => "trial_failure",
            Self::InvalidScale(_) => "invalid_scale",
            Self::Reporting(_) => "reporting_failure",
            Self::Store(_) => "store",
            Self::NotFound(_) => "not_found",
            Self::Config(_) => "config",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }

    /// The innermost error, unwrapping harness context.
    pub fn root_cause(&self) -> &CadenceError {
        match self {
            Self::Setup { source, .. } | Self::Trial { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias for Cadence operations
pub type Result<T> = std::result::Result<T, CadenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trial_failure_message_names_context() {
        let err = CadenceError::trial(
            "read",
            3,
            10,
            ScalePoint::new(1_000),
            CadenceError::Store("connection reset".into()),
        );

        let message = err.to_string();
        assert!(message.contains("trial 3/10"));
        assert!(message.contains("'read'"));
        assert!(message.contains("scale=1000"));
        assert!(message.contains("connection reset"));
        assert_eq!(err.label(), "trial_failure");
    }

    #[test]
    fn root_cause_unwraps_nested_context() {
        let inner = CadenceError::NotFound("playlist 7".into());
        let err = CadenceError::setup("seed", 5, ScalePoint::new(10), inner.clone());

        assert_eq!(err.root_cause(), &inner);
        assert_eq!(inner.root_cause(), &inner);
    }

    #[test]
    fn errors_serialize_with_type_tag() {
        let err = CadenceError::InvalidScale("original_n must be non-zero".into());
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["type"], "InvalidScale");
        assert_eq!(json["detail"], "original_n must be non-zero");
    }
}
