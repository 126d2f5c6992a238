//! On-disk model artifact format
//!
//! An artifact is a JSON document carrying the trained classifier together
//! with the metadata needed to use it safely: the serializer that wrote it,
//! the training feature order and the class labels.

use crate::model::classifier::ClassifierSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Artifact layout version understood by this build
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Serializer identity written into every artifact produced by the trainer
pub const SERIALIZER_NAME: &str = "medpredict-artifact";

/// Serializer version this build reads natively
pub const SERIALIZER_VERSION: &str = "1.2.0";

/// Identity of the library that serialized an artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializerInfo {
    pub name: String,
    pub version: String,
}

impl SerializerInfo {
    /// Serializer info matching this build
    pub fn current() -> Self {
        Self {
            name: SERIALIZER_NAME.to_string(),
            version: SERIALIZER_VERSION.to_string(),
        }
    }
}

/// Parsed `MAJOR.MINOR.PATCH` version triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SemVer {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SemVer {
    /// Parse a version string; missing minor/patch default to 0
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.trim().trim_start_matches('v').split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        let patch = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            major,
            minor,
            patch,
        })
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A trained classifier plus its metadata, as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub serializer: SerializerInfo,
    pub model_name: String,
    pub model_version: String,

    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,

    /// Training feature order; slot `i` of every feature vector means `feature_names[i]`
    pub feature_names: Vec<String>,

    /// Class labels indexed by classifier output position
    pub classes: Vec<String>,

    pub classifier: ClassifierSpec,
}

impl ModelArtifact {
    /// Build an artifact stamped with this build's format and serializer
    pub fn new(
        model_name: impl Into<String>,
        model_version: impl Into<String>,
        feature_names: Vec<String>,
        classes: Vec<String>,
        classifier: ClassifierSpec,
    ) -> Self {
        Self {
            format_version: SUPPORTED_FORMAT_VERSION,
            serializer: SerializerInfo::current(),
            model_name: model_name.into(),
            model_version: model_version.into(),
            trained_at: None,
            feature_names,
            classes,
            classifier,
        }
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Serialize to pretty JSON, as the trainer writes it
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
