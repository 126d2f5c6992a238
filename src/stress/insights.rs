//! Weekly stress report built from daily summaries

use super::processing::{DailySummary, HealthData, RealDataCounts};
use crate::fitness::demo::round1;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Standard deviation above which a week counts as fluctuating
pub const FLUCTUATION_THRESHOLD: f64 = 15.0;
/// Half-to-half change that counts as a trend
pub const TREND_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StressTrend {
    Improving,
    Stable,
    Worsening,
    Fluctuating,
}

impl StressTrend {
    /// Classify a chronological series of stress levels
    pub fn from_levels(levels: &[f64]) -> Self {
        if levels.len() < 2 {
            return Self::Stable;
        }

        if std_dev(levels) > FLUCTUATION_THRESHOLD {
            return Self::Fluctuating;
        }

        let (first, second) = levels.split_at(levels.len() / 2);
        let change = mean(second) - mean(first);
        if change > TREND_THRESHOLD {
            Self::Worsening
        } else if change < -TREND_THRESHOLD {
            Self::Improving
        } else {
            Self::Stable
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressStatistics {
    pub average_stress: f64,
    pub max_stress: f64,
    pub min_stress: f64,
    pub data_points: usize,
}

impl StressStatistics {
    pub fn from_levels(levels: &[f64]) -> Option<Self> {
        if levels.is_empty() {
            return None;
        }
        Some(Self {
            average_stress: round1(mean(levels)),
            max_stress: levels.iter().copied().fold(f64::MIN, f64::max),
            min_stress: levels.iter().copied().fold(f64::MAX, f64::min),
            data_points: levels.len(),
        })
    }
}

/// How much real data backs one metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricStatus {
    Available,
    Partial,
    Missing,
}

/// Per-metric availability of real data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataStatus {
    pub heart_rate: MetricStatus,
    pub sleep: MetricStatus,
    pub activity: MetricStatus,
}

impl DataStatus {
    pub fn from_counts(counts: RealDataCounts) -> Self {
        let activity = if counts.step_points >= MIN_STEP_POINTS {
            MetricStatus::Available
        } else if counts.step_points > 0 {
            MetricStatus::Partial
        } else {
            MetricStatus::Missing
        };
        Self {
            heart_rate: if counts.heart_rate_points > MIN_HEART_RATE_POINTS {
                MetricStatus::Available
            } else {
                MetricStatus::Missing
            },
            sleep: if counts.sleep_sessions > MIN_SLEEP_SESSIONS {
                MetricStatus::Available
            } else {
                MetricStatus::Missing
            },
            activity,
        }
    }

    /// Every metric has enough real points on its own
    pub fn is_dense(&self) -> bool {
        self.heart_rate == MetricStatus::Available
            && self.sleep == MetricStatus::Available
            && self.activity == MetricStatus::Available
    }
}

/// Real heart-rate points needed before the metric counts as available
pub const MIN_HEART_RATE_POINTS: usize = 10;
/// Real sleep sessions needed before the metric counts as available
pub const MIN_SLEEP_SESSIONS: usize = 2;
/// Real step points for available activity; fewer but non-zero is partial
pub const MIN_STEP_POINTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataMetrics {
    pub real_data_days: usize,
    pub total_days: usize,
    pub has_sufficient_data: bool,
    pub has_real_data: bool,
    /// Some days are real and the rest were filled in
    pub show_demo_warning: bool,
    pub status: DataStatus,
    #[serde(flatten)]
    pub counts: RealDataCounts,
}

impl DataMetrics {
    pub fn new(days: &[DailySummary], counts: RealDataCounts) -> Self {
        let real_data_days = days.iter().filter(|d| d.has_real_data).count();
        Self {
            real_data_days,
            total_days: days.len(),
            has_sufficient_data: has_sufficient_data(counts, real_data_days),
            has_real_data: real_data_days > 0,
            show_demo_warning: real_data_days > 0 && real_data_days < days.len(),
            status: DataStatus::from_counts(counts),
            counts,
        }
    }
}

/// Enough real data to trust the report
pub fn has_sufficient_data(counts: RealDataCounts, real_data_days: usize) -> bool {
    DataStatus::from_counts(counts).is_dense() || real_data_days >= 3
}

/// Suggestions from the weekly means
pub fn recommendations(days: &[DailySummary]) -> Vec<String> {
    if days.is_empty() {
        return Vec::new();
    }

    let n = days.len() as f64;
    let avg_sleep = days.iter().map(|d| d.sleep_duration).sum::<f64>() / n;
    let avg_steps = days.iter().map(|d| d.steps as f64).sum::<f64>() / n;
    let avg_hr = days.iter().map(|d| d.heart_rate).sum::<f64>() / n;
    let avg_stress = days.iter().map(|d| d.stress_level).sum::<f64>() / n;

    let mut out = Vec::new();
    if avg_sleep < 7.0 {
        out.push(format!(
            "You averaged {:.1} hours of sleep. Aim for 7 to 9 hours with a consistent bedtime.",
            avg_sleep
        ));
    }
    if avg_steps < 7000.0 {
        out.push(format!(
            "You averaged {:.0} steps a day. A daily walk helps bring stress down.",
            avg_steps
        ));
    }
    if avg_hr > 80.0 {
        out.push(format!(
            "Your average heart rate was {:.0} bpm. Try breathing exercises or meditation.",
            avg_hr
        ));
    }
    if avg_stress >= 75.0 {
        out.push(
            "Your stress has been very high this week. Consider talking to a health professional."
                .to_string(),
        );
    } else if avg_stress >= 50.0 {
        out.push("Schedule short breaks during the day to recover.".to_string());
    }
    if out.is_empty() {
        out.push("Your habits look balanced. Keep up your current routine.".to_string());
    }
    out
}

/// Full insights payload for dashboards
#[derive(Debug, Clone, Serialize)]
pub struct StressInsights {
    pub timestamps: Vec<String>,
    pub stress_levels: Vec<f64>,
    pub heart_rates: Vec<f64>,
    pub sleep_durations: Vec<f64>,
    pub steps_data: Vec<i64>,
    pub calories_data: Vec<f64>,
    pub processed_data: Vec<DailySummary>,
    pub statistics: Option<StressStatistics>,
    pub data_metrics: DataMetrics,
    pub trend: StressTrend,
    pub recommendations: Vec<String>,
    pub is_demo: bool,
    pub generated_at: DateTime<Utc>,
}

impl StressInsights {
    pub fn build(days: Vec<DailySummary>, data: &HealthData, is_demo: bool) -> Self {
        let stress_levels: Vec<f64> = days.iter().map(|d| d.stress_level).collect();

        Self {
            timestamps: days.iter().map(|d| d.date.format("%Y-%m-%d").to_string()).collect(),
            heart_rates: days.iter().map(|d| d.heart_rate).collect(),
            sleep_durations: days.iter().map(|d| d.sleep_duration).collect(),
            steps_data: days.iter().map(|d| d.steps).collect(),
            calories_data: days.iter().map(|d| d.calories).collect(),
            statistics: StressStatistics::from_levels(&stress_levels),
            data_metrics: DataMetrics::new(&days, data.real_counts()),
            trend: StressTrend::from_levels(&stress_levels),
            recommendations: recommendations(&days),
            stress_levels,
            processed_data: days,
            is_demo,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stress::processing::process_health_data;

    #[test]
    fn test_trend_stable() {
        assert_eq!(StressTrend::from_levels(&[50.0; 7]), StressTrend::Stable);
        assert_eq!(StressTrend::from_levels(&[]), StressTrend::Stable);
    }

    #[test]
    fn test_trend_worsening_and_improving() {
        let rising = [40.0, 42.0, 44.0, 50.0, 52.0, 54.0, 56.0];
        assert_eq!(StressTrend::from_levels(&rising), StressTrend::Worsening);

        let falling: Vec<f64> = rising.iter().rev().copied().collect();
        assert_eq!(StressTrend::from_levels(&falling), StressTrend::Improving);
    }

    #[test]
    fn test_trend_fluctuating() {
        let levels = [10.0, 90.0, 10.0, 90.0, 10.0, 90.0];
        assert_eq!(StressTrend::from_levels(&levels), StressTrend::Fluctuating);
    }

    #[test]
    fn test_statistics() {
        let stats = StressStatistics::from_levels(&[40.0, 50.0, 61.0]).unwrap();
        assert_eq!(stats.average_stress, 50.3);
        assert_eq!(stats.max_stress, 61.0);
        assert_eq!(stats.min_stress, 40.0);
        assert_eq!(stats.data_points, 3);
        assert!(StressStatistics::from_levels(&[]).is_none());
    }

    #[test]
    fn test_sufficiency() {
        let dense = RealDataCounts {
            heart_rate_points: 11,
            sleep_sessions: 3,
            step_points: 5,
            calories_points: 0,
        };
        assert!(has_sufficient_data(dense, 0));

        let sparse = RealDataCounts {
            heart_rate_points: 11,
            sleep_sessions: 2,
            step_points: 5,
            calories_points: 0,
        };
        assert!(!has_sufficient_data(sparse, 2));
        assert!(has_sufficient_data(sparse, 3));
    }

    #[test]
    fn test_data_status() {
        let status = DataStatus::from_counts(RealDataCounts {
            heart_rate_points: 11,
            sleep_sessions: 1,
            step_points: 3,
            calories_points: 0,
        });
        assert_eq!(status.heart_rate, MetricStatus::Available);
        assert_eq!(status.sleep, MetricStatus::Missing);
        assert_eq!(status.activity, MetricStatus::Partial);
        assert!(!status.is_dense());

        let none = DataStatus::from_counts(RealDataCounts::default());
        assert_eq!(none.activity, MetricStatus::Missing);
    }

    #[test]
    fn test_demo_warning_only_for_mixed_weeks() {
        let data = HealthData::default();
        let mut days = process_health_data(&data, Utc::now());
        assert!(!DataMetrics::new(&days, data.real_counts()).show_demo_warning);

        days[0].has_real_data = true;
        assert!(DataMetrics::new(&days, data.real_counts()).show_demo_warning);

        for day in days.iter_mut() {
            day.has_real_data = true;
        }
        assert!(!DataMetrics::new(&days, data.real_counts()).show_demo_warning);
    }

    #[test]
    fn test_default_week_recommendations() {
        let days = process_health_data(&HealthData::default(), Utc::now());
        let recs = recommendations(&days);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("breaks"));
    }

    #[test]
    fn test_build_series_align() {
        let data = HealthData::default();
        let days = process_health_data(&data, Utc::now());
        let insights = StressInsights::build(days, &data, true);

        assert_eq!(insights.timestamps.len(), 7);
        assert_eq!(insights.stress_levels.len(), 7);
        assert_eq!(insights.processed_data.len(), 7);
        assert_eq!(insights.data_metrics.real_data_days, 0);
        assert!(!insights.data_metrics.has_sufficient_data);
        assert_eq!(insights.trend, StressTrend::Stable);

        let json = serde_json::to_value(&insights).unwrap();
        assert_eq!(json["data_metrics"]["heart_rate_points"], 0);
        assert_eq!(json["data_metrics"]["status"]["activity"], "missing");
        assert_eq!(json["data_metrics"]["show_demo_warning"], false);
        assert_eq!(json["trend"], "STABLE");
    }
}
