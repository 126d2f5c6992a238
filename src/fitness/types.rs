//! Health metric samples and fitness API wire types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where a sample came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    GoogleFit,
    Demo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    pub timestamp: DateTime<Utc>,
    pub bpm: f64,
    pub source: DataSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSession {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_hours: f64,
    pub kind: String,
    pub source: DataSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSample {
    pub timestamp: DateTime<Utc>,
    pub steps: i64,
    pub source: DataSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalorieSample {
    pub timestamp: DateTime<Utc>,
    pub calories: f64,
    pub source: DataSource,
}

/// Samples with a calendar day and a source, for per-day aggregation
pub trait DailySample {
    fn day(&self) -> NaiveDate;
    fn source(&self) -> DataSource;
    fn value(&self) -> f64;
}

impl DailySample for HeartRateSample {
    fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
    fn source(&self) -> DataSource {
        self.source
    }
    fn value(&self) -> f64 {
        self.bpm
    }
}

impl DailySample for SleepSession {
    fn day(&self) -> NaiveDate {
        self.start.date_naive()
    }
    fn source(&self) -> DataSource {
        self.source
    }
    fn value(&self) -> f64 {
        self.duration_hours
    }
}

impl DailySample for StepSample {
    fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
    fn source(&self) -> DataSource {
        self.source
    }
    fn value(&self) -> f64 {
        self.steps as f64
    }
}

impl DailySample for CalorieSample {
    fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
    fn source(&self) -> DataSource {
        self.source
    }
    fn value(&self) -> f64 {
        self.calories
    }
}

/// Response of `POST dataset:aggregate`
#[derive(Debug, Default, Deserialize)]
pub struct AggregateResponse {
    #[serde(default)]
    pub bucket: Vec<Bucket>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Bucket {
    #[serde(default)]
    pub dataset: Vec<Dataset>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub point: Vec<DataPoint>,
}

#[derive(Debug, Deserialize)]
pub struct DataPoint {
    #[serde(rename = "startTimeNanos")]
    pub start_time_nanos: String,
    #[serde(default)]
    pub value: Vec<PointValue>,
}

#[derive(Debug, Deserialize)]
pub struct PointValue {
    #[serde(rename = "fpVal", default)]
    pub fp_val: Option<f64>,
    #[serde(rename = "intVal", default)]
    pub int_val: Option<i64>,
}

impl DataPoint {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let nanos: i64 = self.start_time_nanos.parse().ok()?;
        DateTime::from_timestamp(
            nanos.div_euclid(1_000_000_000),
            nanos.rem_euclid(1_000_000_000) as u32,
        )
    }

    fn fp(&self) -> Option<f64> {
        self.value.first()?.fp_val
    }

    fn int(&self) -> Option<i64> {
        self.value.first()?.int_val
    }
}

impl AggregateResponse {
    pub fn points(&self) -> impl Iterator<Item = &DataPoint> {
        self.bucket
            .iter()
            .flat_map(|b| b.dataset.iter())
            .flat_map(|d| d.point.iter())
    }

    pub fn heart_rate(&self) -> Vec<HeartRateSample> {
        self.points()
            .filter_map(|p| match (p.timestamp(), p.fp()) {
                (Some(timestamp), Some(bpm)) => Some(HeartRateSample {
                    timestamp,
                    bpm,
                    source: DataSource::GoogleFit,
                }),
                _ => {
                    debug!(point = ?p, "skipping malformed heart rate point");
                    None
                }
            })
            .collect()
    }

    pub fn steps(&self) -> Vec<StepSample> {
        self.points()
            .filter_map(|p| match (p.timestamp(), p.int()) {
                (Some(timestamp), Some(steps)) => Some(StepSample {
                    timestamp,
                    steps,
                    source: DataSource::GoogleFit,
                }),
                _ => {
                    debug!(point = ?p, "skipping malformed step point");
                    None
                }
            })
            .collect()
    }

    pub fn calories(&self) -> Vec<CalorieSample> {
        self.points()
            .filter_map(|p| match (p.timestamp(), p.fp()) {
                (Some(timestamp), Some(calories)) => Some(CalorieSample {
                    timestamp,
                    calories,
                    source: DataSource::GoogleFit,
                }),
                _ => {
                    debug!(point = ?p, "skipping malformed calories point");
                    None
                }
            })
            .collect()
    }
}

/// Response of `GET sessions`
#[derive(Debug, Default, Deserialize)]
pub struct SessionsResponse {
    #[serde(default)]
    pub session: Vec<Session>,
}

#[derive(Debug, Deserialize)]
pub struct Session {
    #[serde(rename = "startTimeMillis")]
    pub start_time_millis: String,
    #[serde(rename = "endTimeMillis")]
    pub end_time_millis: String,
    #[serde(default)]
    pub name: Option<String>,
}

fn from_millis(text: &str) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(text.parse().ok()?)
}

impl SessionsResponse {
    pub fn sleep(&self) -> Vec<SleepSession> {
        self.session
            .iter()
            .filter_map(|s| {
                let start = from_millis(&s.start_time_millis)?;
                let end = from_millis(&s.end_time_millis)?;
                if end < start {
                    debug!(session = ?s, "skipping sleep session ending before it starts");
                    return None;
                }
                Some(SleepSession {
                    start,
                    end,
                    duration_hours: (end - start).num_seconds() as f64 / 3600.0,
                    kind: s.name.clone().unwrap_or_else(|| "Unknown".to_string()),
                    source: DataSource::GoogleFit,
                })
            })
            .collect()
    }
}
