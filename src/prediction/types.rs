//! Prediction result types

use crate::model::VersionSkew;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One class with its predicted probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassScore {
    pub label: String,
    pub probability: f64,
}

/// Classifier output for one feature vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Unique identifier
    pub id: Uuid,

    /// Predicted disease label
    pub label: String,

    /// Probability of the predicted label (0.0 to 1.0)
    pub confidence: f64,

    /// Top alternatives, highest probability first (includes `label`)
    pub ranked: Vec<ClassScore>,

    /// Version of the model that produced this result
    pub model_version: String,

    /// Set when the artifact was loaded despite a serializer version skew
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_skew: Option<VersionSkew>,

    pub created_at: DateTime<Utc>,
}

impl PredictionResult {
    /// Same label, confidence and ranking; ignores id and timestamp
    pub fn same_outcome(&self, other: &PredictionResult) -> bool {
        self.label == other.label && self.confidence == other.confidence && self.ranked == other.ranked
    }

    pub fn confidence_percent(&self) -> f64 {
        (self.confidence * 1000.0).round() / 10.0
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}%)", self.label, self.confidence_percent())
    }
}
