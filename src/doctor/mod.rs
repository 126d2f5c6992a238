//! Doctor command for startup diagnostics
//!
//! Checks that the model artifact exists and loads, that its serializer is
//! compatible, that the vocabulary agrees with the training features, that
//! inference dimensions line up, and whether a fitness account is reachable.

use crate::cli::config::Config;
use crate::encoding::{FeatureEncoder, FeatureVector, SymptomVocabulary};
use crate::errors::PredictError;
use crate::fitness::{FitnessClient, HealthDataSource};
use crate::model::{LoadedModel, ModelLoader};
use crate::prediction::Predictor;
use chrono::{Duration, Utc};
use colored::Colorize;
use std::sync::Arc;

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
        }
    }
}

/// Doctor diagnostics system
pub struct Doctor {
    config: Config,
}

impl Doctor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run all health checks
    pub async fn run_diagnostics(&self) -> Vec<HealthCheck> {
        let mut checks = vec![self.check_artifact_exists()];

        let loader = ModelLoader::new(self.config.artifact_path(), self.config.version_policy());
        match loader.load() {
            Ok(model) => {
                let model = Arc::new(model);
                checks.push(HealthCheck::new("Artifact Load", HealthStatus::Pass));
                checks.push(Self::check_serializer(&model));
                checks.push(self.check_vocabulary(&model));
                checks.push(self.check_dimensions(&model));
            }
            Err(e) => {
                checks.push(HealthCheck::new(
                    "Artifact Load",
                    HealthStatus::Fail(e.to_string()),
                ));
            }
        }

        checks.push(self.check_fitness().await);
        checks
    }

    /// Check 1: artifact file present
    fn check_artifact_exists(&self) -> HealthCheck {
        let path = self.config.artifact_path();
        let status = if path.is_file() {
            HealthStatus::Pass
        } else {
            HealthStatus::Fail(format!("{} not found", path.display()))
        };
        HealthCheck::new("Artifact File", status)
    }

    /// Check 2: serializer version skew
    fn check_serializer(model: &LoadedModel) -> HealthCheck {
        let status = match model.version_skew() {
            None => HealthStatus::Pass,
            Some(skew) => HealthStatus::Warn(format!(
                "written by {}, reader is {}",
                skew.artifact, skew.reader
            )),
        };
        HealthCheck::new("Serializer", status)
    }

    /// Check 3: vocabulary agrees with training feature order
    fn check_vocabulary(&self, model: &LoadedModel) -> HealthCheck {
        let encoder = match self.config.vocabulary_path() {
            Some(path) => SymptomVocabulary::from_file(&path).map(FeatureEncoder::new),
            None => FeatureEncoder::from_artifact(model.artifact()),
        };

        let status = match encoder.and_then(|e| e.verify_schema(model.artifact())) {
            Ok(()) => HealthStatus::Pass,
            Err(e) => HealthStatus::Fail(e.to_string()),
        };
        HealthCheck::new("Vocabulary", status)
    }

    /// Check 4: classifier accepts a vector of the expected width
    fn check_dimensions(&self, model: &Arc<LoadedModel>) -> HealthCheck {
        let predictor = Predictor::new(Arc::clone(model)).with_top_k(self.config.model.top_k);
        let blank = FeatureVector::zeros(model.n_features());

        let status = match predictor.predict(&blank) {
            Ok(result) if result.ranked.is_empty() => {
                HealthStatus::Fail("classifier produced no ranking".to_string())
            }
            Ok(_) => HealthStatus::Pass,
            Err(e) => HealthStatus::Fail(e.to_string()),
        };
        HealthCheck::new("Dimensions", status)
    }

    /// Check 5: fitness account reachable
    async fn check_fitness(&self) -> HealthCheck {
        let client = match FitnessClient::from_config(&self.config.fitness) {
            Ok(Some(client)) => client,
            Ok(None) => {
                return HealthCheck::new(
                    "Fitness API",
                    HealthStatus::Warn("no access token, stress insights use demo data".to_string()),
                )
            }
            Err(e) => return HealthCheck::new("Fitness API", HealthStatus::Fail(e.to_string())),
        };

        let now = Utc::now();
        let status = match client.steps(now - Duration::days(1), now).await {
            Ok(_) => HealthStatus::Pass,
            Err(PredictError::FitnessApi(msg)) => HealthStatus::Warn(msg),
            Err(e) => HealthStatus::Warn(format!("unreachable: {}", e)),
        };
        HealthCheck::new("Fitness API", status)
    }

    /// Display diagnostics results
    pub fn display_results(checks: &[HealthCheck]) {
        println!("\n{}\n", "medpredict diagnostics".bold());
        println!("{:<16} Status", "Check");
        println!("{}", "=".repeat(50));

        for check in checks {
            let line = match &check.status {
                HealthStatus::Pass => "PASS".green().to_string(),
                HealthStatus::Warn(msg) => format!("WARN: {}", msg).yellow().to_string(),
                HealthStatus::Fail(msg) => format!("FAIL: {}", msg).red().to_string(),
            };
            println!("{:<16} {}", check.name, line);
        }

        println!();
    }

    /// Get overall health status
    pub fn overall_status(checks: &[HealthCheck]) -> bool {
        !checks.iter().any(|c| matches!(c.status, HealthStatus::Fail(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassifierSpec, ModelArtifact};

    fn write_artifact(dir: &std::path::Path) -> std::path::PathBuf {
        let artifact = ModelArtifact::new(
            "disease",
            "1",
            vec!["fever".into(), "cough".into()],
            vec!["Flu".into(), "Cold".into()],
            ClassifierSpec::LogisticRegression {
                coefficients: vec![vec![1.0, 0.5], vec![-1.0, 0.5]],
                intercepts: vec![0.0, 0.0],
            },
        );
        let path = dir.join("model.json");
        std::fs::write(&path, artifact.to_json().unwrap()).unwrap();
        path
    }

    fn config_for(path: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.model.artifact_path = path.to_string_lossy().to_string();
        config
    }

    #[tokio::test]
    async fn test_healthy_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(dir.path());
        let checks = Doctor::new(config_for(&path)).run_diagnostics().await;

        let names: Vec<&str> = checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            ["Artifact File", "Artifact Load", "Serializer", "Vocabulary", "Dimensions", "Fitness API"]
        );
        assert!(Doctor::overall_status(&checks));
        assert!(matches!(checks[5].status, HealthStatus::Warn(_)));
    }

    #[tokio::test]
    async fn test_missing_artifact_fails() {
        let dir = tempfile::tempdir().unwrap();
        let checks = Doctor::new(config_for(&dir.path().join("absent.json")))
            .run_diagnostics()
            .await;

        assert!(!Doctor::overall_status(&checks));
        assert!(matches!(checks[0].status, HealthStatus::Fail(_)));
        assert!(matches!(checks[1].status, HealthStatus::Fail(_)));
    }

    #[tokio::test]
    async fn test_vocabulary_disagreement_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(dir.path());
        let vocab = dir.path().join("symptoms.txt");
        std::fs::write(&vocab, "cough\nfever\n").unwrap();

        let mut config = config_for(&path);
        config.model.vocabulary_path = Some(vocab.to_string_lossy().to_string());
        let checks = Doctor::new(config).run_diagnostics().await;

        let vocabulary = checks.iter().find(|c| c.name == "Vocabulary").unwrap();
        assert!(matches!(vocabulary.status, HealthStatus::Fail(_)));
    }

    #[test]
    fn test_overall_status() {
        let checks = vec![
            HealthCheck::new("a", HealthStatus::Pass),
            HealthCheck::new("b", HealthStatus::Warn("w".to_string())),
        ];
        assert!(Doctor::overall_status(&checks));

        let checks = vec![HealthCheck::new("a", HealthStatus::Fail("f".to_string()))];
        assert!(!Doctor::overall_status(&checks));
    }
}
