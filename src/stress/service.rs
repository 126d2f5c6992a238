//! Collects health data and produces stress insights

use super::insights::StressInsights;
use super::processing::{process_health_data, HealthData, REPORT_DAYS};
use crate::cli::config::FitnessConfig;
use crate::errors::Result;
use crate::fitness::{DemoSource, FitnessClient, HealthDataSource};
use crate::telemetry::{TelemetryCollector, TelemetryEvent};
use chrono::{DateTime, Duration, Utc};
use std::time::Instant;
use tracing::{info, warn};

/// Stress insights over a connected source with demo fallback
pub struct StressService {
    source: Option<Box<dyn HealthDataSource>>,
    demo: DemoSource,
    lookback_days: i64,
    telemetry: Option<TelemetryCollector>,
}

/// Fetch one metric from the demo source; defaults fill in on failure
macro_rules! fetch_or_default {
    ($demo:expr, $metric:ident, $start:expr, $end:expr) => {
        match $demo.$metric($start, $end).await {
            Ok(samples) => samples,
            Err(e) => {
                warn!(metric = stringify!($metric), error = %e, "demo generation failed");
                Vec::new()
            }
        }
    };
}

/// Fetch one metric, substituting demo data when the source fails
macro_rules! fetch_or_demo {
    ($self:ident, $source:expr, $metric:ident, $start:expr, $demo_start:expr, $end:expr) => {
        match $source.$metric($start, $end).await {
            Ok(samples) => samples,
            Err(e) => {
                warn!(
                    source = $source.name(),
                    metric = stringify!($metric),
                    error = %e,
                    "fetch failed, using demo data"
                );
                fetch_or_default!($self.demo, $metric, $demo_start, $end)
            }
        }
    };
}

impl StressService {
    pub fn new(source: Option<Box<dyn HealthDataSource>>, demo: DemoSource) -> Self {
        Self {
            source,
            demo,
            lookback_days: REPORT_DAYS,
            telemetry: None,
        }
    }

    /// Real client when a token is configured, demo only otherwise
    pub fn from_config(config: &FitnessConfig) -> Result<Self> {
        let source = FitnessClient::from_config(config)?
            .map(|client| Box::new(client) as Box<dyn HealthDataSource>);
        if source.is_none() {
            info!("no fitness token configured, stress insights use demo data");
        }
        Ok(Self::new(source, DemoSource::new(config.demo_seed))
            .with_lookback_days(config.lookback_days))
    }

    /// Days of history requested from the source; never shorter than the report
    pub fn with_lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = days.max(REPORT_DAYS);
        self
    }

    pub fn with_telemetry(mut self, telemetry: TelemetryCollector) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn is_connected(&self) -> bool {
        self.source.is_some()
    }

    /// Gather every metric for the window, falling back per metric
    ///
    /// Demo fill-in only covers the trailing report week of the window.
    pub async fn collect(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> HealthData {
        let demo_start = start.max(end - Duration::days(REPORT_DAYS));
        match &self.source {
            Some(source) => HealthData {
                heart_rate: fetch_or_demo!(self, source, heart_rate, start, demo_start, end),
                sleep: fetch_or_demo!(self, source, sleep, start, demo_start, end),
                steps: fetch_or_demo!(self, source, steps, start, demo_start, end),
                calories: fetch_or_demo!(self, source, calories, start, demo_start, end),
            },
            None => self.collect_demo(demo_start, end).await,
        }
    }

    async fn collect_demo(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> HealthData {
        HealthData {
            heart_rate: fetch_or_default!(self.demo, heart_rate, start, end),
            sleep: fetch_or_default!(self.demo, sleep, start, end),
            steps: fetch_or_default!(self.demo, steps, start, end),
            calories: fetch_or_default!(self.demo, calories, start, end),
        }
    }

    /// Weekly insights ending at `now`
    pub async fn insights(&self, now: DateTime<Utc>) -> StressInsights {
        let started = Instant::now();
        let start = now - Duration::days(REPORT_DAYS);

        let data = self.collect(now - Duration::days(self.lookback_days), now).await;
        let days = process_health_data(&data, now);
        let real_days = days.iter().filter(|d| d.has_real_data).count();

        let insights = if real_days == 0 {
            if self.is_connected() {
                warn!("connected source returned no usable data, reporting demo week");
            }
            let demo = self.collect_demo(start, now).await;
            StressInsights::build(process_health_data(&demo, now), &demo, true)
        } else {
            StressInsights::build(days, &data, false)
        };

        info!(
            real_data_days = insights.data_metrics.real_data_days,
            lookback_days = self.lookback_days,
            trend = ?insights.trend,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "stress insights generated"
        );

        if let Some(telemetry) = &self.telemetry {
            telemetry.record(TelemetryEvent::StressReportServed {
                real_data_days: insights.data_metrics.real_data_days,
                timestamp: Utc::now(),
            });
        }

        insights
    }
}
