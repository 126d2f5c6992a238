//! Per-day aggregation of raw health samples

use super::scoring::{calculate_stress_level, StressCategory};
use crate::fitness::demo::round1;
use crate::fitness::{
    CalorieSample, DailySample, DataSource, HeartRateSample, SleepSession, StepSample,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

pub const DEFAULT_HEART_RATE: f64 = 72.0;
pub const DEFAULT_SLEEP_HOURS: f64 = 7.0;
pub const DEFAULT_STEPS: i64 = 8000;
pub const DEFAULT_CALORIES: f64 = 2000.0;

/// Days covered by a weekly report
pub const REPORT_DAYS: i64 = 7;

/// Raw samples for a reporting window, real and demo mixed
#[derive(Debug, Clone, Default)]
pub struct HealthData {
    pub heart_rate: Vec<HeartRateSample>,
    pub sleep: Vec<SleepSession>,
    pub steps: Vec<StepSample>,
    pub calories: Vec<CalorieSample>,
}

/// Counts of samples that came from the connected account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RealDataCounts {
    pub heart_rate_points: usize,
    pub sleep_sessions: usize,
    pub step_points: usize,
    pub calories_points: usize,
}

fn count_real<T: DailySample>(samples: &[T]) -> usize {
    samples
        .iter()
        .filter(|s| s.source() == DataSource::GoogleFit)
        .count()
}

impl HealthData {
    pub fn real_counts(&self) -> RealDataCounts {
        RealDataCounts {
            heart_rate_points: count_real(&self.heart_rate),
            sleep_sessions: count_real(&self.sleep),
            step_points: count_real(&self.steps),
            calories_points: count_real(&self.calories),
        }
    }
}

/// Which source fed each metric of a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricSources {
    pub heart_rate: DataSource,
    pub sleep: DataSource,
    pub steps: DataSource,
    pub calories: DataSource,
}

/// One aggregated day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub heart_rate: f64,
    pub sleep_duration: f64,
    pub steps: i64,
    pub calories: f64,
    pub stress_level: f64,
    pub stress_category: StressCategory,
    pub stress_color: &'static str,
    pub has_real_data: bool,
    pub data_sources: MetricSources,
}

/// Values of one metric on one day, real samples first
struct DayValues {
    values: Vec<f64>,
    source: DataSource,
    real: bool,
}

fn day_values<T: DailySample>(samples: &[T], day: NaiveDate) -> DayValues {
    let of_source = |source: DataSource| -> Vec<f64> {
        samples
            .iter()
            .filter(|s| s.day() == day && s.source() == source)
            .map(DailySample::value)
            .collect()
    };

    let real = of_source(DataSource::GoogleFit);
    if !real.is_empty() {
        return DayValues {
            values: real,
            source: DataSource::GoogleFit,
            real: true,
        };
    }
    DayValues {
        values: of_source(DataSource::Demo),
        source: DataSource::Demo,
        real: false,
    }
}

fn mean_or(values: &[f64], default: f64) -> f64 {
    if values.is_empty() {
        default
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn sum_or(values: &[f64], default: f64) -> f64 {
    if values.is_empty() {
        default
    } else {
        values.iter().sum()
    }
}

/// Aggregate `REPORT_DAYS` days starting at `now - REPORT_DAYS`
pub fn process_health_data(data: &HealthData, now: DateTime<Utc>) -> Vec<DailySummary> {
    let first = (now - Duration::days(REPORT_DAYS)).date_naive();

    first
        .iter_days()
        .take(REPORT_DAYS as usize)
        .map(|day| summarize_day(data, day))
        .collect()
}

fn summarize_day(data: &HealthData, day: NaiveDate) -> DailySummary {
    let hr = day_values(&data.heart_rate, day);
    let sleep = day_values(&data.sleep, day);
    let steps = day_values(&data.steps, day);
    let calories = day_values(&data.calories, day);

    let heart_rate = mean_or(&hr.values, DEFAULT_HEART_RATE);
    let sleep_duration = mean_or(&sleep.values, DEFAULT_SLEEP_HOURS);
    let total_steps = sum_or(&steps.values, DEFAULT_STEPS as f64).round() as i64;
    let total_calories = sum_or(&calories.values, DEFAULT_CALORIES);

    let stress_level = calculate_stress_level(heart_rate, sleep_duration, total_steps);
    let category = StressCategory::from_level(stress_level);
    let has_real_data = hr.real || sleep.real || steps.real || calories.real;

    debug!(
        %day,
        heart_rate,
        sleep_duration,
        steps = total_steps,
        stress_level,
        has_real_data,
        "processed day"
    );

    DailySummary {
        date: day,
        heart_rate: round1(heart_rate),
        sleep_duration: round1(sleep_duration),
        steps: total_steps,
        calories: round1(total_calories),
        stress_level: round1(stress_level),
        stress_category: category,
        stress_color: category.color(),
        has_real_data,
        data_sources: MetricSources {
            heart_rate: hr.source,
            sleep: sleep.source,
            steps: steps.source,
            calories: calories.source,
        },
    }
}
