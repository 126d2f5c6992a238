//! Prediction request pipeline
//!
//! State machine plus the handler that drives encoder and predictor.

pub mod handler;
pub mod state;

pub use handler::{
    symptoms_from_form, HandledRequest, ModelStatus, PipelineOutcome, PredictionPipeline,
    RequestHandler,
};
pub use state::{PipelineEvent, PipelineState};
