//! Prediction over loaded classifier artifacts

pub mod predictor;
pub mod types;

pub use predictor::{Predictor, DEFAULT_TOP_K};
pub use types::{ClassScore, PredictionResult};
