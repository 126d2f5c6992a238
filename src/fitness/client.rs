//! HTTP client for the fitness REST API

use super::types::{
    AggregateResponse, CalorieSample, HeartRateSample, SessionsResponse, SleepSession, StepSample,
};
use super::HealthDataSource;
use crate::cli::config::FitnessConfig;
use crate::errors::{PredictError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

const DAY_MILLIS: i64 = 86_400_000;
const SLEEP_ACTIVITY_TYPE: &str = "72";

const HEART_RATE_TYPE: &str = "com.google.heart_rate.bpm";
const HEART_RATE_SOURCE: &str =
    "derived:com.google.heart_rate.bpm:com.google.android.gms:merge_heart_rate_bpm";
const STEPS_TYPE: &str = "com.google.step_count.delta";
const STEPS_SOURCE: &str =
    "derived:com.google.step_count.delta:com.google.android.gms:merge_step_deltas";
const CALORIES_TYPE: &str = "com.google.calories.expended";
const CALORIES_SOURCE: &str =
    "derived:com.google.calories.expended:com.google.android.gms:merge_calories_expended";

/// Client for the fitness REST API
pub struct FitnessClient {
    client: Client,
    base_url: String,
    token: String,
}

impl FitnessClient {
    /// Create a client with a bearer token
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PredictError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Build from configuration; `None` when no token is configured
    pub fn from_config(config: &FitnessConfig) -> Result<Option<Self>> {
        match config.access_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(Some(Self::new(
                &config.base_url,
                token,
                Duration::from_secs(config.timeout_sec),
            )?)),
            _ => Ok(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn aggregate(
        &self,
        data_type: &str,
        data_source: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<AggregateResponse> {
        let url = format!("{}/dataset:aggregate", self.base_url);
        let body = aggregate_body(data_type, data_source, start, end);
        debug!(%url, data_type, "requesting aggregate");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(PredictError::FitnessApi(format!(
                "access to {} denied; the token lacks the required scope",
                data_type
            )));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PredictError::FitnessApi(format!(
                "{} aggregate failed with {}: {}",
                data_type, status, text
            )));
        }

        Ok(response.json().await?)
    }

    async fn sessions(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        activity_type: Option<&str>,
    ) -> Result<(StatusCode, Option<SessionsResponse>)> {
        let url = format!("{}/sessions", self.base_url);
        let mut query = vec![
            ("startTime", start.to_rfc3339()),
            ("endTime", end.to_rfc3339()),
        ];
        if let Some(kind) = activity_type {
            query.push(("activityType", kind.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok((status, Some(response.json().await?)))
        } else {
            Ok((status, None))
        }
    }
}

/// Request body for a daily-bucketed aggregate query
pub fn aggregate_body(
    data_type: &str,
    data_source: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> serde_json::Value {
    json!({
        "aggregateBy": [{
            "dataTypeName": data_type,
            "dataSourceId": data_source,
        }],
        "bucketByTime": { "durationMillis": DAY_MILLIS },
        "startTimeMillis": start.timestamp_millis(),
        "endTimeMillis": end.timestamp_millis(),
    })
}

#[async_trait]
impl HealthDataSource for FitnessClient {
    fn name(&self) -> &'static str {
        "google_fit"
    }

    async fn heart_rate(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HeartRateSample>> {
        let resp = self
            .aggregate(HEART_RATE_TYPE, HEART_RATE_SOURCE, start, end)
            .await?;
        Ok(resp.heart_rate())
    }

    async fn sleep(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<SleepSession>> {
        let (status, body) = self
            .sessions(start, end, Some(SLEEP_ACTIVITY_TYPE))
            .await?;

        let body = match (status, body) {
            (_, Some(body)) => body,
            (StatusCode::BAD_REQUEST, None) => {
                warn!("sleep session filter rejected, retrying without activity type");
                match self.sessions(start, end, None).await? {
                    (_, Some(body)) => body,
                    (status, None) => {
                        return Err(PredictError::FitnessApi(format!(
                            "sleep sessions failed with {}",
                            status
                        )))
                    }
                }
            }
            (status, None) => {
                return Err(PredictError::FitnessApi(format!(
                    "sleep sessions failed with {}",
                    status
                )))
            }
        };

        Ok(body.sleep())
    }

    async fn steps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<StepSample>> {
        let resp = self.aggregate(STEPS_TYPE, STEPS_SOURCE, start, end).await?;
        Ok(resp.steps())
    }

    async fn calories(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalorieSample>> {
        let resp = self
            .aggregate(CALORIES_TYPE, CALORIES_SOURCE, start, end)
            .await?;
        Ok(resp.calories())
    }
}
