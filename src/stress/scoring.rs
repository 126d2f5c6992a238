//! Stress score from daily vitals

use serde::{Deserialize, Serialize};

pub const BASELINE_STRESS: f64 = 50.0;

/// Stress score in `0..=100` from heart rate, sleep and activity
pub fn calculate_stress_level(heart_rate: f64, sleep_hours: f64, steps: i64) -> f64 {
    let mut score = BASELINE_STRESS;

    if heart_rate > 80.0 {
        score += (heart_rate - 80.0) * 0.5;
    } else if heart_rate < 60.0 {
        score += (60.0 - heart_rate) * 0.3;
    }

    if steps < 5000 {
        score += (5000 - steps) as f64 * 0.001;
    }

    if sleep_hours < 6.0 {
        score += (6.0 - sleep_hours) * 5.0;
    }

    score.clamp(0.0, 100.0)
}

/// Banded stress category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StressCategory {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl StressCategory {
    pub fn from_level(level: f64) -> Self {
        if level < 25.0 {
            Self::Low
        } else if level < 50.0 {
            Self::Moderate
        } else if level < 75.0 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    /// Display color hint for dashboards
    pub fn color(&self) -> &'static str {
        match self {
            Self::Low => "success",
            Self::Moderate => "info",
            Self::High => "warning",
            Self::VeryHigh => "danger",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resting_day_scores_baseline() {
        assert_eq!(calculate_stress_level(72.0, 7.0, 8000), 50.0);
    }

    #[test]
    fn test_high_heart_rate_raises_score() {
        assert_eq!(calculate_stress_level(100.0, 7.0, 8000), 60.0);
    }

    #[test]
    fn test_low_heart_rate_raises_score() {
        assert!((calculate_stress_level(50.0, 7.0, 8000) - 53.0).abs() < 1e-9);
    }

    #[test]
    fn test_inactivity_and_short_sleep() {
        let level = calculate_stress_level(72.0, 4.0, 2000);
        assert!((level - 63.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_to_100() {
        assert_eq!(calculate_stress_level(200.0, 0.0, 0), 100.0);
    }

    #[test]
    fn test_category_bands() {
        assert_eq!(StressCategory::from_level(0.0), StressCategory::Low);
        assert_eq!(StressCategory::from_level(24.9), StressCategory::Low);
        assert_eq!(StressCategory::from_level(25.0), StressCategory::Moderate);
        assert_eq!(StressCategory::from_level(50.0), StressCategory::High);
        assert_eq!(StressCategory::from_level(75.0), StressCategory::VeryHigh);
        assert_eq!(StressCategory::VeryHigh.color(), "danger");
    }

    #[test]
    fn test_category_serializes_upper() {
        let json = serde_json::to_string(&StressCategory::VeryHigh).unwrap();
        assert_eq!(json, "\"VERY_HIGH\"");
    }
}
