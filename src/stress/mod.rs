//! Stress analysis from daily health metrics

pub mod insights;
pub mod processing;
pub mod scoring;
pub mod service;

pub use insights::{
    has_sufficient_data, recommendations, DataMetrics, DataStatus, MetricStatus, StressInsights,
    StressStatistics, StressTrend,
};
pub use processing::{process_health_data, DailySummary, HealthData, MetricSources, RealDataCounts};
pub use scoring::{calculate_stress_level, StressCategory};
pub use service::StressService;
