//! Symptom set to feature vector encoding

use crate::encoding::vocabulary::{SymptomSet, SymptomVocabulary};
use crate::errors::{PredictError, Result};
use crate::model::ModelArtifact;
use serde::Serialize;

/// Fixed-order binary encoding of a symptom set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Indices of slots set to 1
    pub fn active(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > 0.0)
            .map(|(i, _)| i)
            .collect()
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Encodes symptom sets against one vocabulary
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    vocabulary: SymptomVocabulary,
}

impl FeatureEncoder {
    pub fn new(vocabulary: SymptomVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Encoder whose vocabulary is the artifact's own training feature order
    pub fn from_artifact(artifact: &ModelArtifact) -> Result<Self> {
        Ok(Self::new(SymptomVocabulary::new(&artifact.feature_names)?))
    }

    pub fn vocabulary(&self) -> &SymptomVocabulary {
        &self.vocabulary
    }

    /// Encode a symptom set; any symptom outside the vocabulary is an error
    pub fn encode(&self, symptoms: &SymptomSet) -> Result<FeatureVector> {
        let mut vector = FeatureVector::zeros(self.vocabulary.len());
        for name in symptoms.iter() {
            let slot = self
                .vocabulary
                .position(name)
                .ok_or_else(|| PredictError::UnknownSymptom(name.to_string()))?;
            vector.0[slot] = 1.0;
        }
        Ok(vector)
    }

    /// Fail unless the vocabulary equals the artifact's training feature order
    pub fn verify_schema(&self, artifact: &ModelArtifact) -> Result<()> {
        let ours = self.vocabulary.names();
        let theirs: Vec<String> = artifact
            .feature_names
            .iter()
            .map(|n| crate::encoding::normalize_symptom(n))
            .collect();

        let len = ours.len().max(theirs.len());
        for position in 0..len {
            let expected = theirs.get(position);
            let found = ours.get(position);
            if expected != found {
                return Err(PredictError::SchemaMismatch {
                    position,
                    expected: expected.cloned(),
                    found: found.cloned(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClassifierSpec;

    fn encoder() -> FeatureEncoder {
        FeatureEncoder::new(SymptomVocabulary::new(["fever", "cough", "fatigue"]).unwrap())
    }

    fn artifact(features: &[&str]) -> ModelArtifact {
        ModelArtifact::new(
            "disease",
            "test",
            features.iter().map(|s| s.to_string()).collect(),
            vec!["Flu".into()],
            ClassifierSpec::LogisticRegression {
                coefficients: vec![vec![0.0; features.len()]],
                intercepts: vec![0.0],
            },
        )
    }

    #[test]
    fn test_encode_single_symptom() {
        let set: SymptomSet = ["cough"].into_iter().collect();
        let vector = encoder().encode(&set).unwrap();
        assert_eq!(vector.as_slice(), &[0.0, 1.0, 0.0]);
        assert_eq!(vector.active(), vec![1]);
    }

    #[test]
    fn test_encode_empty_set_is_all_zeros() {
        let vector = encoder().encode(&SymptomSet::new()).unwrap();
        assert_eq!(vector, FeatureVector::zeros(3));
    }

    #[test]
    fn test_encode_unknown_symptom() {
        let set: SymptomSet = ["cough", "chills"].into_iter().collect();
        match encoder().encode(&set) {
            Err(PredictError::UnknownSymptom(name)) => assert_eq!(name, "chills"),
            other => panic!("expected UnknownSymptom, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_matches() {
        assert!(encoder()
            .verify_schema(&artifact(&["fever", "cough", "fatigue"]))
            .is_ok());
    }

    #[test]
    fn test_schema_order_mismatch() {
        let err = encoder()
            .verify_schema(&artifact(&["fever", "fatigue", "cough"]))
            .unwrap_err();
        match err {
            PredictError::SchemaMismatch {
                position,
                expected,
                found,
            } => {
                assert_eq!(position, 1);
                assert_eq!(expected.as_deref(), Some("fatigue"));
                assert_eq!(found.as_deref(), Some("cough"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_schema_length_mismatch() {
        let err = encoder()
            .verify_schema(&artifact(&["fever", "cough"]))
            .unwrap_err();
        assert!(matches!(
            err,
            PredictError::SchemaMismatch {
                position: 2,
                expected: None,
                ..
            }
        ));
    }
}
