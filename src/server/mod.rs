//! HTTP surface
//!
//! Routes:
//! - `GET /health`
//! - `GET /api/symptoms`, `GET /api/model`, `GET /api/stats`
//! - `POST /api/predict` (JSON) and `POST /predict` (form, HTML fragment)
//! - `GET /api/stress/insights`

pub mod render;
pub mod routes;

use crate::cli::config::Config;
use crate::errors::Result;
use crate::pipeline::RequestHandler;
use crate::stress::StressService;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<RequestHandler>,
    pub stress: Arc<StressService>,
}

impl AppState {
    pub fn new(handler: RequestHandler, stress: StressService) -> Self {
        Self {
            handler: Arc::new(handler),
            stress: Arc::new(stress),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/symptoms", get(routes::symptoms))
        .route("/api/model", get(routes::model_info))
        .route("/api/predict", post(routes::predict_json))
        .route("/predict", post(routes::predict_form))
        .route("/api/stats", get(routes::stats))
        .route("/api/stress/insights", get(routes::stress_insights))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        %addr,
        model_ready = state.handler.is_ready(),
        fitness_connected = state.stress.is_connected(),
        "medpredict listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .await?;

    Ok(())
}
