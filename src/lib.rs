//! medpredict - symptom-based disease prediction service
//!
//! Loads a pre-trained classifier artifact once at startup and serves
//! predictions over HTTP and the CLI. Also builds weekly stress insights
//! from fitness data.
//!
//! # Architecture
//!
//! - **model**: artifact loading, serializer compatibility, inference kernels
//! - **encoding**: symptom vocabulary and feature vectors
//! - **prediction**: classifier invocation and ranked results
//! - **pipeline**: request state machine and handler
//! - **server**: axum routes
//! - **fitness** / **stress**: health data sources and stress scoring

pub mod errors;

pub use errors::{FailureKind, PredictError, Result};

// Prediction path
pub mod encoding;
pub mod model;
pub mod pipeline;
pub mod prediction;

// Stress analysis
pub mod fitness;
pub mod stress;

// Interface layer
pub mod cli;
pub mod doctor;
pub mod server;
pub mod telemetry;
