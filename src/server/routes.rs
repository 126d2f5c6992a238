//! HTTP handlers

use super::render::render_outcome;
use super::AppState;
use crate::encoding::SymptomSet;
use crate::errors::PredictError;
use crate::pipeline::{ModelStatus, PipelineOutcome};
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{Form, Json, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Events listed by `/api/stats`
const RECENT_EVENTS: usize = 20;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub symptoms: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ModelInfo<'a> {
    model_name: &'a str,
    model_version: &'a str,
    classifier: &'static str,
    classes: &'a [String],
    n_features: usize,
    serializer: String,
    loaded_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_skew: Option<&'a crate::model::VersionSkew>,
}

fn unavailable(state: &AppState) -> Response {
    let kind = match state.handler.status() {
        ModelStatus::Unavailable { kind, .. } => *kind,
        ModelStatus::Ready(_) => crate::errors::FailureKind::Internal,
    };
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "status": "failed",
            "kind": kind,
            "message": kind.user_message(),
        })),
    )
        .into_response()
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "model_ready": state.handler.is_ready(),
    }))
}

pub async fn symptoms(State(state): State<AppState>) -> Response {
    match state.handler.pipeline() {
        Some(pipeline) => Json(json!({
            "symptoms": pipeline.encoder().vocabulary().names(),
        }))
        .into_response(),
        None => unavailable(&state),
    }
}

pub async fn model_info(State(state): State<AppState>) -> Response {
    let Some(pipeline) = state.handler.pipeline() else {
        return unavailable(&state);
    };
    let model = pipeline.model();
    let artifact = model.artifact();

    Json(ModelInfo {
        model_name: &artifact.model_name,
        model_version: &artifact.model_version,
        classifier: model.classifier_kind(),
        classes: model.classes(),
        n_features: model.n_features(),
        serializer: format!("{} {}", artifact.serializer.name, artifact.serializer.version),
        loaded_at: model.loaded_at().to_rfc3339(),
        version_skew: model.version_skew(),
    })
    .into_response()
}

pub async fn predict_json(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let handled = match payload {
        Ok(Json(request)) => {
            let symptoms: SymptomSet = request.symptoms.iter().map(String::as_str).collect();
            state.handler.handle(symptoms)
        }
        Err(rejection) => state
            .handler
            .reject(PredictError::MalformedRequest(rejection.body_text())),
    };

    let status = match &handled.outcome {
        PipelineOutcome::Rendered { .. } => StatusCode::OK,
        PipelineOutcome::Failed { kind, .. } if kind.is_user_error() => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PipelineOutcome::Failed { .. } => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(handled.outcome)).into_response()
}

pub async fn predict_form(
    State(state): State<AppState>,
    payload: Result<Form<Vec<(String, String)>>, FormRejection>,
) -> Html<String> {
    let handled = match payload {
        Ok(Form(pairs)) => state.handler.handle_form(&pairs),
        Err(rejection) => state
            .handler
            .reject(PredictError::MalformedRequest(rejection.body_text())),
    };
    Html(render_outcome(&handled.outcome))
}

pub async fn stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    let telemetry = state.handler.telemetry();
    let stats = telemetry.get_stats();
    Json(json!({
        "uptime_sec": telemetry.elapsed().as_secs(),
        "success_rate": telemetry.success_rate(),
        "mean_latency_ms": stats.mean_latency_ms(),
        "counters": stats,
        "recent_events": telemetry.recent_events(RECENT_EVENTS),
    }))
}

pub async fn stress_insights(State(state): State<AppState>) -> Response {
    Json(state.stress.insights(Utc::now()).await).into_response()
}
