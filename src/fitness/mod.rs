//! Health data sources
//!
//! A REST client for a connected fitness account and a synthetic
//! generator used when none is connected.

pub mod client;
pub mod demo;
pub mod types;

pub use client::FitnessClient;
pub use demo::DemoSource;
pub use types::{
    CalorieSample, DailySample, DataSource, HeartRateSample, SleepSession, StepSample,
};

use crate::errors::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Provider of raw health metrics over a time window
#[async_trait]
pub trait HealthDataSource: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    async fn heart_rate(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<HeartRateSample>>;

    async fn sleep(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<SleepSession>>;

    async fn steps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<StepSample>>;

    async fn calories(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<CalorieSample>>;
}
