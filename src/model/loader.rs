//! Model artifact loading and serializer compatibility checks
//!
//! The loader is run once at process start. The resulting [`LoadedModel`]
//! is immutable and handed to the request pipeline behind an `Arc`.

use crate::encoding::normalize_symptom;
use crate::errors::{PredictError, Result};
use crate::model::artifact::{
    ModelArtifact, SemVer, SERIALIZER_NAME, SERIALIZER_VERSION, SUPPORTED_FORMAT_VERSION,
};
use crate::model::classifier::Classifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What to do when the artifact's serializer differs in minor/patch version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VersionPolicy {
    /// Reject any skew
    #[default]
    Strict,
    /// Load anyway, log a warning and flag every prediction
    Warn,
}

impl VersionPolicy {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "strict" => Some(VersionPolicy::Strict),
            "warn" => Some(VersionPolicy::Warn),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VersionPolicy::Strict => "strict",
            VersionPolicy::Warn => "warn",
        }
    }
}

/// Serializer version skew tolerated under [`VersionPolicy::Warn`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSkew {
    pub artifact: String,
    pub reader: String,
}

/// A validated artifact ready for inference
#[derive(Debug)]
pub struct LoadedModel {
    artifact: ModelArtifact,
    source: PathBuf,
    version_skew: Option<VersionSkew>,
    loaded_at: DateTime<Utc>,
}

impl LoadedModel {
    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn version_skew(&self) -> Option<&VersionSkew> {
        self.version_skew.as_ref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn n_features(&self) -> usize {
        self.artifact.n_features()
    }

    pub fn classes(&self) -> &[String] {
        &self.artifact.classes
    }

    pub fn classifier_kind(&self) -> &'static str {
        self.artifact.classifier.kind()
    }
}

/// Reads and validates model artifacts from disk
#[derive(Debug, Clone)]
pub struct ModelLoader {
    path: PathBuf,
    policy: VersionPolicy,
}

impl ModelLoader {
    pub fn new(path: impl Into<PathBuf>, policy: VersionPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, deserialize and validate the artifact
    pub fn load(&self) -> Result<LoadedModel> {
        let contents = match std::fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PredictError::ArtifactNotFound {
                    path: self.path.clone(),
                })
            }
            Err(e) => return Err(PredictError::Io(e)),
        };

        let artifact: ModelArtifact = serde_json::from_slice(&contents)
            .map_err(|e| PredictError::incompatible(format!("cannot deserialize artifact: {}", e)))?;

        let model = self.validate(artifact)?;
        info!(
            path = %self.path.display(),
            model = %model.artifact.model_name,
            version = %model.artifact.model_version,
            kind = model.classifier_kind(),
            features = model.n_features(),
            classes = model.classes().len(),
            "model artifact loaded"
        );
        Ok(model)
    }

    /// Validate an already-deserialized artifact
    pub fn validate(&self, artifact: ModelArtifact) -> Result<LoadedModel> {
        if artifact.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(PredictError::incompatible(format!(
                "artifact format version {} is not supported (expected {})",
                artifact.format_version, SUPPORTED_FORMAT_VERSION
            )));
        }

        let version_skew = self.check_serializer(&artifact)?;
        check_metadata(&artifact)?;

        artifact
            .classifier
            .validate(artifact.n_features(), artifact.n_classes())
            .map_err(PredictError::incompatible)?;

        Ok(LoadedModel {
            artifact,
            source: self.path.clone(),
            version_skew,
            loaded_at: Utc::now(),
        })
    }

    fn check_serializer(&self, artifact: &ModelArtifact) -> Result<Option<VersionSkew>> {
        if artifact.serializer.name != SERIALIZER_NAME {
            return Err(PredictError::incompatible(format!(
                "artifact written by unknown serializer '{}'",
                artifact.serializer.name
            )));
        }

        let written = SemVer::parse(&artifact.serializer.version).ok_or_else(|| {
            PredictError::incompatible(format!(
                "unparseable serializer version '{}'",
                artifact.serializer.version
            ))
        })?;
        let reader = SemVer::parse(SERIALIZER_VERSION)
            .ok_or_else(|| PredictError::Generic("invalid built-in serializer version".to_string()))?;

        if written == reader {
            return Ok(None);
        }

        if written.major != reader.major {
            return Err(PredictError::incompatible(format!(
                "serializer major version {} cannot be read by {}",
                written, reader
            )));
        }

        match self.policy {
            VersionPolicy::Strict => Err(PredictError::incompatible(format!(
                "serializer version skew: artifact {} vs reader {} (version policy is strict)",
                written, reader
            ))),
            VersionPolicy::Warn => {
                warn!(
                    artifact = %written,
                    reader = %reader,
                    "serializer version skew; predictions will be flagged"
                );
                Ok(Some(VersionSkew {
                    artifact: written.to_string(),
                    reader: reader.to_string(),
                }))
            }
        }
    }
}

fn check_metadata(artifact: &ModelArtifact) -> Result<()> {
    if artifact.feature_names.is_empty() {
        return Err(PredictError::incompatible("artifact declares no features"));
    }
    if artifact.classes.is_empty() {
        return Err(PredictError::incompatible("artifact declares no classes"));
    }

    // Compare normalized names; the encoder vocabulary folds case and separators.
    let mut seen = HashSet::new();
    for name in &artifact.feature_names {
        if !seen.insert(normalize_symptom(name)) {
            return Err(PredictError::incompatible(format!(
                "duplicate feature name '{}'",
                name
            )));
        }
    }
    Ok(())
}
