//! Request handling for symptom submissions
//!
//! The handler owns the encoder and predictor built at startup and turns
//! every submission into a [`PipelineOutcome`]. Failures are rendered, never
//! propagated, so a bad request or a broken model cannot take the server down.

use crate::cli::config::ModelConfig;
use crate::cli::Config;
use crate::encoding::{FeatureEncoder, FeatureVector, SymptomSet, SymptomVocabulary};
use crate::errors::{FailureKind, PredictError, Result};
use crate::model::{LoadedModel, ModelLoader};
use crate::pipeline::state::{PipelineEvent, PipelineState};
use crate::prediction::{PredictionResult, Predictor};
use crate::telemetry::{TelemetryCollector, TelemetryEvent};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Encoder and predictor verified against each other
#[derive(Debug, Clone)]
pub struct PredictionPipeline {
    encoder: FeatureEncoder,
    predictor: Predictor,
}

impl PredictionPipeline {
    /// Combine an encoder and predictor after checking the vocabulary against the model
    pub fn new(encoder: FeatureEncoder, predictor: Predictor) -> Result<Self> {
        encoder.verify_schema(predictor.model().artifact())?;
        Ok(Self { encoder, predictor })
    }

    /// Load the artifact and vocabulary named in the model configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let model = ModelLoader::new(config.artifact_path(), config.version_policy()).load()?;
        let vocabulary = match config.vocabulary_path() {
            Some(path) => Some(SymptomVocabulary::from_file(&path)?),
            None => None,
        };
        Self::assemble(Arc::new(model), vocabulary, &config.model)
    }

    /// Build from an already-loaded model; without a vocabulary the artifact's own order is used
    pub fn assemble(
        model: Arc<LoadedModel>,
        vocabulary: Option<SymptomVocabulary>,
        config: &ModelConfig,
    ) -> Result<Self> {
        let encoder = match vocabulary {
            Some(vocabulary) => FeatureEncoder::new(vocabulary),
            None => FeatureEncoder::from_artifact(model.artifact())?,
        };
        let predictor = Predictor::new(model).with_top_k(config.top_k);
        Self::new(encoder, predictor)
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    pub fn model(&self) -> &LoadedModel {
        self.predictor.model()
    }

    pub fn encode(&self, symptoms: &SymptomSet) -> Result<FeatureVector> {
        self.encoder.encode(symptoms)
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult> {
        self.predictor.predict(features)
    }
}

/// Whether the model came up at startup
#[derive(Debug)]
pub enum ModelStatus {
    Ready(PredictionPipeline),
    Unavailable { kind: FailureKind, detail: String },
}

/// Final result of one request
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Rendered {
        symptoms: Vec<String>,
        result: PredictionResult,
    },
    Failed {
        kind: FailureKind,
        message: String,
    },
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Rendered { .. })
    }

    fn failed(kind: FailureKind) -> Self {
        PipelineOutcome::Failed {
            kind,
            message: kind.user_message().to_string(),
        }
    }
}

/// Outcome plus the states the request passed through
#[derive(Debug, Clone, Serialize)]
pub struct HandledRequest {
    pub outcome: PipelineOutcome,
    pub trace: Vec<PipelineState>,
}

impl HandledRequest {
    pub fn final_state(&self) -> PipelineState {
        self.trace.last().copied().unwrap_or(PipelineState::Idle)
    }
}

struct Run {
    state: PipelineState,
    trace: Vec<PipelineState>,
}

impl Run {
    fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            trace: vec![PipelineState::Idle],
        }
    }

    fn fire(&mut self, event: PipelineEvent) {
        self.state = match self.state.transition(event) {
            Ok(next) => next,
            Err(e) => {
                error!(error = %e, "pipeline state machine violated");
                PipelineState::Failed
            }
        };
        self.trace.push(self.state);
    }

    fn finish(self, outcome: PipelineOutcome) -> HandledRequest {
        HandledRequest {
            outcome,
            trace: self.trace,
        }
    }
}

/// Drives submissions through validation and prediction
pub struct RequestHandler {
    status: ModelStatus,
    telemetry: TelemetryCollector,
}

impl RequestHandler {
    pub fn new(pipeline: PredictionPipeline) -> Self {
        Self {
            status: ModelStatus::Ready(pipeline),
            telemetry: TelemetryCollector::new(),
        }
    }

    /// Handler that renders the given load error for every request
    pub fn unavailable(err: &PredictError) -> Self {
        Self {
            status: ModelStatus::Unavailable {
                kind: err.kind(),
                detail: err.to_string(),
            },
            telemetry: TelemetryCollector::new(),
        }
    }

    /// Build from configuration; load failures become an unavailable handler unless fail-fast
    pub fn from_config(config: &Config) -> Result<Self> {
        match PredictionPipeline::from_config(config) {
            Ok(pipeline) => Ok(Self::new(pipeline)),
            Err(e) if !config.model.fail_fast => {
                error!(error = %e, "model unavailable; serving error responses");
                Ok(Self::unavailable(&e))
            }
            Err(e) => Err(e),
        }
    }

    pub fn with_telemetry(mut self, telemetry: TelemetryCollector) -> Self {
        if let ModelStatus::Ready(pipeline) = &self.status {
            let artifact = pipeline.model().artifact();
            telemetry.record(TelemetryEvent::ModelLoaded {
                model: artifact.model_name.clone(),
                version: artifact.model_version.clone(),
                timestamp: Utc::now(),
            });
        }
        self.telemetry = telemetry;
        self
    }

    pub fn telemetry(&self) -> &TelemetryCollector {
        &self.telemetry
    }

    pub fn status(&self) -> &ModelStatus {
        &self.status
    }

    pub fn pipeline(&self) -> Option<&PredictionPipeline> {
        match &self.status {
            ModelStatus::Ready(pipeline) => Some(pipeline),
            ModelStatus::Unavailable { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.pipeline().is_some()
    }

    /// Handle a raw urlencoded form submission
    pub fn handle_form(&self, pairs: &[(String, String)]) -> HandledRequest {
        self.handle(symptoms_from_form(pairs))
    }

    /// Handle an already-collected symptom set
    pub fn handle(&self, symptoms: SymptomSet) -> HandledRequest {
        let started = Instant::now();
        let mut run = Run::new();
        run.fire(PipelineEvent::Submit);

        let pipeline = match &self.status {
            ModelStatus::Ready(pipeline) => pipeline,
            ModelStatus::Unavailable { kind, detail } => {
                error!(detail = %detail, "prediction requested while model unavailable");
                run.fire(PipelineEvent::Abort);
                return self.fail(run, *kind);
            }
        };

        let features = if symptoms.is_empty() {
            Err(PredictError::EmptySymptomSet)
        } else {
            pipeline.encode(&symptoms)
        };
        let features = match features {
            Ok(features) => features,
            Err(e) => {
                warn!(error = %e, "submission rejected");
                run.fire(PipelineEvent::InputRejected);
                return self.fail(run, e.kind());
            }
        };
        run.fire(PipelineEvent::InputAccepted);
        debug!(active = ?features.active(), "symptoms encoded");

        match pipeline.predict(&features) {
            Ok(result) => {
                run.fire(PipelineEvent::PredictionComplete);
                self.telemetry.record(TelemetryEvent::PredictionServed {
                    label: result.label.clone(),
                    latency_ms: started.elapsed().as_millis() as u64,
                    timestamp: Utc::now(),
                });
                debug!(label = %result.label, confidence = result.confidence, "prediction served");
                run.finish(PipelineOutcome::Rendered {
                    symptoms: symptoms.iter().map(str::to_string).collect(),
                    result,
                })
            }
            Err(e) => {
                error!(error = %e, "prediction failed");
                run.fire(PipelineEvent::PredictionFailed);
                self.fail(run, e.kind())
            }
        }
    }

    /// Reject a submission whose body could not be decoded
    pub fn reject(&self, err: PredictError) -> HandledRequest {
        let mut run = Run::new();
        run.fire(PipelineEvent::Submit);
        warn!(error = %err, "submission rejected");
        run.fire(PipelineEvent::InputRejected);
        self.fail(run, err.kind())
    }

    fn fail(&self, run: Run, kind: FailureKind) -> HandledRequest {
        self.telemetry.record(TelemetryEvent::PredictionFailed {
            kind,
            timestamp: Utc::now(),
        });
        run.finish(PipelineOutcome::failed(kind))
    }
}

/// Collect symptoms from form pairs
///
/// Accepts `symptoms`, `symptoms[]` and numbered `symptom1`..`symptomN` keys;
/// values may be comma-separated. Other keys are ignored.
pub fn symptoms_from_form(pairs: &[(String, String)]) -> SymptomSet {
    let mut set = SymptomSet::new();
    for (key, value) in pairs {
        if !is_symptom_key(key) {
            continue;
        }
        for part in value.split(',') {
            set.insert(part);
        }
    }
    set
}

fn is_symptom_key(key: &str) -> bool {
    if key == "symptoms" || key == "symptoms[]" {
        return true;
    }
    match key.strip_prefix("symptom") {
        Some(rest) => !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassifierSpec, ModelArtifact, VersionPolicy};

    fn pipeline() -> PredictionPipeline {
        let artifact = ModelArtifact::new(
            "disease",
            "unit",
            vec!["fever".into(), "cough".into(), "fatigue".into()],
            vec!["Flu".into(), "Common Cold".into()],
            ClassifierSpec::LogisticRegression {
                coefficients: vec![vec![2.0, 0.0, 1.0], vec![0.0, 2.0, 0.0]],
                intercepts: vec![0.0, 0.0],
            },
        );
        let model = ModelLoader::new("mem", VersionPolicy::Strict)
            .validate(artifact)
            .unwrap();
        PredictionPipeline::assemble(Arc::new(model), None, &ModelConfig::default()).unwrap()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_form_key_parsing() {
        let set = symptoms_from_form(&pairs(&[
            ("symptom1", "Fever"),
            ("symptom2", ""),
            ("symptoms", "cough, fatigue"),
            ("csrfmiddlewaretoken", "abc"),
            ("symptomatic", "yes"),
        ]));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["cough", "fatigue", "fever"]);
    }

    #[test]
    fn test_handle_success_trace() {
        let handler = RequestHandler::new(pipeline());
        let handled = handler.handle_form(&pairs(&[("symptoms", "fever")]));
        assert!(handled.outcome.is_success());
        assert_eq!(
            handled.trace,
            vec![
                PipelineState::Idle,
                PipelineState::Validating,
                PipelineState::Predicting,
                PipelineState::Rendered
            ]
        );
        assert_eq!(handler.telemetry().get_stats().predictions_served, 1);
    }

    #[test]
    fn test_handle_empty_submission() {
        let handler = RequestHandler::new(pipeline());
        let handled = handler.handle(SymptomSet::new());
        assert_eq!(handled.final_state(), PipelineState::Failed);
        match handled.outcome {
            PipelineOutcome::Failed { kind, .. } => assert_eq!(kind, FailureKind::EmptySymptomSet),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_handle_unknown_symptom() {
        let handler = RequestHandler::new(pipeline());
        let handled = handler.handle_form(&pairs(&[("symptoms", "fever,hiccups")]));
        match handled.outcome {
            PipelineOutcome::Failed { kind, message } => {
                assert_eq!(kind, FailureKind::UnknownSymptom);
                assert!(!message.contains("hiccups"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(handler.telemetry().get_stats().user_errors, 1);
    }

    #[test]
    fn test_reject_malformed_body() {
        let handler = RequestHandler::new(pipeline());
        let handled = handler.reject(PredictError::MalformedRequest(
            "invalid type: string \"cough\"".to_string(),
        ));
        assert_eq!(
            handled.trace,
            vec![
                PipelineState::Idle,
                PipelineState::Validating,
                PipelineState::Failed
            ]
        );
        match handled.outcome {
            PipelineOutcome::Failed { kind, message } => {
                assert_eq!(kind, FailureKind::MalformedRequest);
                assert!(!message.contains("invalid type"));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(handler.telemetry().get_stats().user_errors, 1);
    }

    #[test]
    fn test_unavailable_handler_renders_failure() {
        let err = PredictError::ArtifactNotFound {
            path: "missing.json".into(),
        };
        let handler = RequestHandler::unavailable(&err);
        assert!(!handler.is_ready());
        let handled = handler.handle_form(&pairs(&[("symptoms", "fever")]));
        assert_eq!(handled.final_state(), PipelineState::Failed);
        assert!(matches!(
            handled.outcome,
            PipelineOutcome::Failed {
                kind: FailureKind::ArtifactNotFound,
                ..
            }
        ));
    }

    #[test]
    fn test_classifier_failure_ends_in_failed() {
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
        let pipeline =
            PredictionPipeline::assemble(Arc::new(model), None, &ModelConfig::default()).unwrap();
        let handler = RequestHandler::new(pipeline);

        let handled = handler.handle_form(&pairs(&[("symptoms", "fever,cough")]));
        assert_eq!(
            handled.trace[handled.trace.len() - 2..],
            [PipelineState::Predicting, PipelineState::Failed]
        );
        assert!(matches!(
            handled.outcome,
            PipelineOutcome::Failed {
                kind: FailureKind::Inference,
                ..
            }
        ));
        assert_eq!(handler.telemetry().get_stats().model_errors, 1);
    }

    #[test]
    fn test_mismatched_vocabulary_rejected() {
        let vocabulary = SymptomVocabulary::new(["cough", "fever", "fatigue"]).unwrap();
        let model = pipeline().predictor().model().artifact().clone();
        let model = ModelLoader::new("mem", VersionPolicy::Strict)
            .validate(model)
            .unwrap();
        let result =
            PredictionPipeline::assemble(Arc::new(model), Some(vocabulary), &ModelConfig::default());
        assert!(matches!(result, Err(PredictError::SchemaMismatch { position: 0, .. })));
    }
}
