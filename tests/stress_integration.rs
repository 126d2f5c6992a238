//! Stress insights over seeded demo data and a scripted source

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use medpredict::errors::{PredictError, Result};
use medpredict::fitness::{
    CalorieSample, DataSource, DemoSource, HealthDataSource, HeartRateSample, SleepSession,
    StepSample,
};
use medpredict::stress::{
    calculate_stress_level, StressCategory, StressService, StressTrend,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 18, 0, 0).unwrap()
}

fn midnight(at: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&at.date_naive().and_hms_opt(0, 0, 0).unwrap())
}

/// A stressed week: rising heart rate, short sleep, few steps; calories unavailable
struct StressedWeek;

#[async_trait]
impl HealthDataSource for StressedWeek {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn heart_rate(&self, start: DateTime<Utc>, _: DateTime<Utc>) -> Result<Vec<HeartRateSample>> {
        Ok((0..7)
            .flat_map(|day| {
                (8..20).map(move |hour| HeartRateSample {
                    timestamp: midnight(start) + Duration::days(day) + Duration::hours(hour),
                    bpm: 78.0 + day as f64 * 5.0,
                    source: DataSource::GoogleFit,
                })
            })
            .collect())
    }

    async fn sleep(&self, start: DateTime<Utc>, _: DateTime<Utc>) -> Result<Vec<SleepSession>> {
        Ok((0..7)
            .map(|day| {
                let begin = midnight(start) + Duration::days(day) + Duration::hours(4);
                SleepSession {
                    start: begin,
                    end: begin + Duration::hours(5),
                    duration_hours: 5.0,
                    kind: "Night".to_string(),
                    source: DataSource::GoogleFit,
                }
            })
            .collect())
    }

    async fn steps(&self, start: DateTime<Utc>, _: DateTime<Utc>) -> Result<Vec<StepSample>> {
        Ok((0..7)
            .map(|day| StepSample {
                timestamp: midnight(start) + Duration::days(day) + Duration::hours(8),
                steps: 3000,
                source: DataSource::GoogleFit,
            })
            .collect())
    }

    async fn calories(&self, _: DateTime<Utc>, _: DateTime<Utc>) -> Result<Vec<CalorieSample>> {
        Err(PredictError::FitnessApi("access denied".to_string()))
    }
}

#[tokio::test]
async fn test_seeded_demo_is_reproducible() {
    let a = StressService::new(None, DemoSource::new(Some(2024))).insights(now()).await;
    let b = StressService::new(None, DemoSource::new(Some(2024))).insights(now()).await;

    assert_eq!(a.stress_levels, b.stress_levels);
    assert_eq!(a.steps_data, b.steps_data);
    assert!(a.is_demo);
}

#[tokio::test]
async fn test_demo_week_is_well_formed() {
    let insights = StressService::new(None, DemoSource::new(Some(7))).insights(now()).await;

    assert_eq!(insights.timestamps.len(), 7);
    assert_eq!(insights.timestamps[0], "2024-05-13");
    for day in &insights.processed_data {
        assert!((0.0..=100.0).contains(&day.stress_level));
        assert_eq!(day.stress_category, StressCategory::from_level(day.stress_level));
        assert_eq!(day.stress_color, day.stress_category.color());
        assert!(!day.has_real_data);
    }
    assert!(!insights.recommendations.is_empty());
}

#[tokio::test]
async fn test_stressed_week_from_connected_source() {
    let service = StressService::new(Some(Box::new(StressedWeek)), DemoSource::new(Some(1)));
    let insights = service.insights(now()).await;

    assert!(!insights.is_demo);
    assert_eq!(insights.data_metrics.real_data_days, 7);
    assert!(insights.data_metrics.has_sufficient_data);
    assert_eq!(insights.data_metrics.counts.calories_points, 0);

    let first = &insights.processed_data[0];
    assert_eq!(first.heart_rate, 78.0);
    assert_eq!(first.sleep_duration, 5.0);
    assert_eq!(first.steps, 3000);
    assert_eq!(first.data_sources.calories, DataSource::Demo);
    assert_eq!(first.stress_level, calculate_stress_level(78.0, 5.0, 3000));

    assert_eq!(insights.trend, StressTrend::Worsening);
    assert!(insights
        .recommendations
        .iter()
        .any(|r| r.contains("hours of sleep")));
    assert!(insights.recommendations.iter().any(|r| r.contains("steps")));
}
