//! Synthetic health data for when no fitness account is connected

use super::types::{
    CalorieSample, DataSource, HeartRateSample, SleepSession, StepSample,
};
use super::HealthDataSource;
use crate::errors::Result;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::sync::Mutex;

const SLEEP_KINDS: [&str; 4] = ["Deep", "Light", "REM", "Awake"];

/// Generator of plausible heart rate, sleep, step and calorie data
pub struct DemoSource {
    rng: Mutex<StdRng>,
}

impl DemoSource {
    /// Seeded for reproducible output, or from entropy when `seed` is `None`
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }

    /// One reading per hour, shaped by time of day
    pub fn generate_heart_rate(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<HeartRateSample>> {
        let noise = Normal::<f64>::new(0.0, 2.0)?;
        let night = Normal::<f64>::new(58.0, 3.0)?;
        let morning = Normal::<f64>::new(72.0, 5.0)?;
        let day = Normal::<f64>::new(78.0, 8.0)?;
        let evening = Normal::<f64>::new(68.0, 4.0)?;
        Ok(self.with_rng(|rng| {
            let mut samples = Vec::new();
            let mut current = start;
            while current < end && samples.len() < 24 * 7 {
                let band = match current.hour() {
                    2..=6 => &night,
                    7..=9 => &morning,
                    10..=18 => &day,
                    _ => &evening,
                };
                let bpm = (band.sample(rng) + noise.sample(rng)).clamp(50.0, 120.0);
                samples.push(HeartRateSample {
                    timestamp: current,
                    bpm: round1(bpm),
                    source: DataSource::Demo,
                });
                current += Duration::hours(1);
            }
            samples
        }))
    }

    /// At most one night per day, skipped on roughly one day in five
    pub fn generate_sleep(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<SleepSession>> {
        let length = Normal::<f64>::new(7.5, 1.0)?;
        let bedtime = Normal::<f64>::new(23.0, 1.5)?;
        Ok(self.with_rng(|rng| {
            let mut sessions = Vec::new();
            for day in days_between(start, end) {
                if rng.gen::<f64>() <= 0.2 {
                    continue;
                }
                let hours = length.sample(rng).clamp(4.0, 10.0);
                let start = midnight(day) + minutes(bedtime.sample(rng));
                let kind = SLEEP_KINDS[rng.gen_range(0..SLEEP_KINDS.len())];
                sessions.push(SleepSession {
                    start,
                    end: start + minutes(hours),
                    duration_hours: round1(hours),
                    kind: kind.to_string(),
                    source: DataSource::Demo,
                });
            }
            sessions
        }))
    }

    /// Daily step totals; weekends are lazier
    pub fn generate_steps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<StepSample>> {
        let weekday = Normal::<f64>::new(8000.0, 1500.0)?;
        let weekend = Normal::<f64>::new(6000.0, 2000.0)?;
        Ok(self.with_rng(|rng| {
            days_between(start, end)
                .map(|day| {
                    let dist = if is_weekend(day) { &weekend } else { &weekday };
                    StepSample {
                        timestamp: midnight(day),
                        steps: dist.sample(rng).clamp(1000.0, 20000.0) as i64,
                        source: DataSource::Demo,
                    }
                })
                .collect()
        }))
    }

    /// Daily calorie totals, loosely tied to activity
    pub fn generate_calories(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<CalorieSample>> {
        let steps = Normal::<f64>::new(8000.0, 2000.0)?;
        let basal = Normal::<f64>::new(1600.0, 200.0)?;
        Ok(self.with_rng(|rng| {
            days_between(start, end)
                .map(|day| {
                    let calories =
                        (steps.sample(rng) * 0.04 + basal.sample(rng)).clamp(1200.0, 3500.0);
                    CalorieSample {
                        timestamp: midnight(day),
                        calories: round1(calories),
                        source: DataSource::Demo,
                    }
                })
                .collect()
        }))
    }
}

#[async_trait]
impl HealthDataSource for DemoSource {
    fn name(&self) -> &'static str {
        "demo"
    }

    async fn heart_rate(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<HeartRateSample>> {
        self.generate_heart_rate(start, end)
    }

    async fn sleep(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<SleepSession>> {
        self.generate_sleep(start, end)
    }

    async fn steps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<StepSample>> {
        self.generate_steps(start, end)
    }

    async fn calories(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<CalorieSample>> {
        self.generate_calories(start, end)
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn minutes(hours: f64) -> Duration {
    Duration::minutes((hours * 60.0).round() as i64)
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN))
}

fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Calendar days from `start` to `end`, inclusive
fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> impl Iterator<Item = NaiveDate> {
    let last = end.date_naive();
    start
        .date_naive()
        .iter_days()
        .take_while(move |day| *day <= last)
}
