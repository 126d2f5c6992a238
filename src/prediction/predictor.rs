//! Classifier invocation over encoded feature vectors

use crate::encoding::FeatureVector;
use crate::errors::{PredictError, Result};
use crate::model::{Classifier, LoadedModel};
use crate::prediction::types::{ClassScore, PredictionResult};
use chrono::Utc;
use std::cmp::Ordering;
use std::sync::Arc;
use uuid::Uuid;

/// Default number of ranked alternatives returned per prediction
pub const DEFAULT_TOP_K: usize = 3;

/// Allowed drift of the probability sum from 1
const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Runs the loaded classifier; cheap to clone, shares the model
#[derive(Debug, Clone)]
pub struct Predictor {
    model: Arc<LoadedModel>,
    top_k: usize,
}

impl Predictor {
    pub fn new(model: Arc<LoadedModel>) -> Self {
        Self {
            model,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn model(&self) -> &LoadedModel {
        &self.model
    }

    /// Predict the disease for one feature vector
    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult> {
        let artifact = self.model.artifact();
        let expected = artifact.n_features();
        if features.len() != expected {
            return Err(PredictError::Inference {
                expected,
                actual: features.len(),
                reason: "feature vector length does not match model input".to_string(),
            });
        }

        let proba = artifact.classifier.predict_proba(features.as_slice());
        let total: f64 = proba.iter().sum();
        if proba.len() != artifact.n_classes()
            || proba.iter().any(|p| !p.is_finite())
            || (total - 1.0).abs() > PROBABILITY_TOLERANCE
        {
            return Err(PredictError::Inference {
                expected,
                actual: features.len(),
                reason: "classifier produced invalid probabilities".to_string(),
            });
        }

        let ranked = rank(&proba, &artifact.classes, self.top_k);
        let best = ranked[0].clone();

        Ok(PredictionResult {
            id: Uuid::new_v4(),
            label: best.label,
            confidence: best.probability,
            ranked,
            model_version: artifact.model_version.clone(),
            version_skew: self.model.version_skew().cloned(),
            created_at: Utc::now(),
        })
    }
}

/// Highest probability first; ties keep the lower class index first
fn rank(proba: &[f64], classes: &[String], top_k: usize) -> Vec<ClassScore> {
    let mut order: Vec<usize> = (0..proba.len()).collect();
    order.sort_by(|a, b| {
        proba[*b]
            .partial_cmp(&proba[*a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(b))
    });
    order
        .into_iter()
        .take(top_k.max(1))
        .map(|i| ClassScore {
            label: classes[i].clone(),
            probability: proba[i],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassifierSpec, ModelArtifact, ModelLoader, VersionPolicy};

    fn predictor() -> Predictor {
        let artifact = ModelArtifact::new(
            "disease",
            "unit",
            vec!["fever".into(), "cough".into(), "fatigue".into()],
            vec!["Flu".into(), "Common Cold".into(), "Anemia".into()],
            ClassifierSpec::LogisticRegression {
                coefficients: vec![
                    vec![2.0, 0.5, 0.5],
                    vec![0.0, 2.0, 0.0],
                    vec![0.0, 0.0, 2.0],
                ],
                intercepts: vec![0.0, 0.0, 0.0],
            },
        );
        let model = ModelLoader::new("mem", VersionPolicy::Strict)
            .validate(artifact)
            .unwrap();
        Predictor::new(Arc::new(model))
    }

    #[test]
    fn test_predict_label() {
        let result = predictor()
            .predict(&FeatureVector::from(vec![0.0, 1.0, 0.0]))
            .unwrap();
        assert_eq!(result.label, "Common Cold");
        assert_eq!(result.ranked.len(), 3);
        assert!(result.confidence > 0.5);
        assert!(result.version_skew.is_none());
    }

    #[test]
    fn test_predict_is_deterministic() {
        let p = predictor();
        let v = FeatureVector::from(vec![1.0, 1.0, 0.0]);
        let a = p.predict(&v).unwrap();
        let b = p.predict(&v).unwrap();
        assert!(a.same_outcome(&b));
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = predictor()
            .predict(&FeatureVector::from(vec![1.0, 0.0]))
            .unwrap_err();
        assert!(matches!(
            err,
            PredictError::Inference {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_non_finite_probabilities() {
        let artifact = ModelArtifact::new(
            "disease",
            "unit",
            vec!["fever".into(), "cough".into()],
            vec!["Flu".into(), "Common Cold".into()],
            ClassifierSpec::LogisticRegression {
                coefficients: vec![vec![1e308, 1e308], vec![0.0, 0.0]],
                intercepts: vec![0.0, 0.0],
            },
        );
        let model = ModelLoader::new("mem", VersionPolicy::Strict)
            .validate(artifact)
            .unwrap();
        let err = Predictor::new(Arc::new(model))
            .predict(&FeatureVector::from(vec![1.0, 1.0]))
            .unwrap_err();
        assert!(matches!(err, PredictError::Inference { .. }));
    }

    #[test]
    fn test_tie_breaks_on_lowest_index() {
        // All-zero input gives uniform probabilities.
        let result = predictor().predict(&FeatureVector::zeros(3)).unwrap();
        assert_eq!(result.label, "Flu");
        assert_eq!(result.ranked[1].label, "Common Cold");
    }

    #[test]
    fn test_top_k_truncates() {
        let result = predictor()
            .with_top_k(1)
            .predict(&FeatureVector::zeros(3))
            .unwrap();
        assert_eq!(result.ranked.len(), 1);
    }
}
