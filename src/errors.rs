//! Error types for medpredict
//!
//! One error enum covers the prediction pipeline, the stress pipeline and
//! the ambient plumbing (config, I/O, HTTP).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the prediction service
#[derive(Error, Debug)]
pub enum PredictError {
    /// Model artifact missing on disk
    #[error("Model artifact not found at {path:?}")]
    ArtifactNotFound { path: PathBuf },

    /// Artifact could not be read by this build (format, serializer or shape)
    #[error("Incompatible model artifact: {reason}")]
    IncompatibleArtifact { reason: String },

    /// Symptom identifier outside the known vocabulary
    #[error("Unknown symptom: {0}")]
    UnknownSymptom(String),

    /// Submission carried no symptoms at all
    #[error("No symptoms submitted")]
    EmptySymptomSet,

    /// Request body could not be decoded
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Feature vector does not fit the loaded classifier
    #[error("Inference failed: {reason} (expected {expected} features, got {actual})")]
    Inference {
        expected: usize,
        actual: usize,
        reason: String,
    },

    /// Encoder vocabulary disagrees with the artifact's training order
    #[error("Schema mismatch at position {position}: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        position: usize,
        expected: Option<String>,
        found: Option<String>,
    },

    /// Request pipeline state machine errors
    #[error("Invalid state transition from {from:?} to {to:?}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Fitness API errors
    #[error("Fitness API error: {0}")]
    FitnessApi(String),

    /// Invalid parameters for a sampling distribution
    #[error("Sampling error: {0}")]
    Sampling(#[from] rand_distr::NormalError),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for medpredict operations
pub type Result<T> = std::result::Result<T, PredictError>;

/// Stable, serializable classification of a pipeline failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ArtifactNotFound,
    IncompatibleArtifact,
    UnknownSymptom,
    EmptySymptomSet,
    MalformedRequest,
    Inference,
    SchemaMismatch,
    Internal,
}

impl FailureKind {
    /// Whether the failure was caused by the submitted input
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            FailureKind::UnknownSymptom
                | FailureKind::EmptySymptomSet
                | FailureKind::MalformedRequest
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::ArtifactNotFound => "artifact_not_found",
            FailureKind::IncompatibleArtifact => "incompatible_artifact",
            FailureKind::UnknownSymptom => "unknown_symptom",
            FailureKind::EmptySymptomSet => "empty_symptom_set",
            FailureKind::MalformedRequest => "malformed_request",
            FailureKind::Inference => "inference",
            FailureKind::SchemaMismatch => "schema_mismatch",
            FailureKind::Internal => "internal",
        }
    }

    /// Message safe to show to an end user
    pub fn user_message(&self) -> &'static str {
        match self {
            FailureKind::UnknownSymptom => {
                "One or more of the selected symptoms is not recognised. Please choose from the list."
            }
            FailureKind::EmptySymptomSet => "Please select at least one symptom.",
            FailureKind::MalformedRequest => {
                "The submission could not be read. Please send a list of symptoms."
            }
            _ => "Prediction is temporarily unavailable. Please try again later.",
        }
    }
}

impl PredictError {
    /// Map the error onto its failure kind
    pub fn kind(&self) -> FailureKind {
        match self {
            PredictError::ArtifactNotFound { .. } => FailureKind::ArtifactNotFound,
            PredictError::IncompatibleArtifact { .. } => FailureKind::IncompatibleArtifact,
            PredictError::UnknownSymptom(_) => FailureKind::UnknownSymptom,
            PredictError::EmptySymptomSet => FailureKind::EmptySymptomSet,
            PredictError::MalformedRequest(_) => FailureKind::MalformedRequest,
            PredictError::Inference { .. } => FailureKind::Inference,
            PredictError::SchemaMismatch { .. } => FailureKind::SchemaMismatch,
            _ => FailureKind::Internal,
        }
    }

    pub(crate) fn incompatible(reason: impl Into<String>) -> Self {
        PredictError::IncompatibleArtifact {
            reason: reason.into(),
        }
    }
}

/// Convert anyhow errors to PredictError
impl From<anyhow::Error> for PredictError {
    fn from(err: anyhow::Error) -> Self {
        PredictError::Generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PredictError::Inference {
            expected: 132,
            actual: 3,
            reason: "dimension mismatch".to_string(),
        };
        assert!(err.to_string().contains("132"));
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn test_schema_mismatch_display() {
        let err = PredictError::SchemaMismatch {
            position: 2,
            expected: Some("fatigue".to_string()),
            found: Some("chills".to_string()),
        };
        let text = err.to_string();
        assert!(text.contains("position 2"));
        assert!(text.contains("fatigue"));
        assert!(text.contains("chills"));
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            PredictError::UnknownSymptom("x".into()).kind(),
            FailureKind::UnknownSymptom
        );
        assert_eq!(
            PredictError::incompatible("bad").kind(),
            FailureKind::IncompatibleArtifact
        );
        assert_eq!(
            PredictError::ConfigError("x".into()).kind(),
            FailureKind::Internal
        );
    }

    #[test]
    fn test_user_messages_hide_detail() {
        assert!(FailureKind::UnknownSymptom.is_user_error());
        assert!(!FailureKind::Inference.is_user_error());
        assert!(!FailureKind::IncompatibleArtifact
            .user_message()
            .contains("serializer"));
    }
}
