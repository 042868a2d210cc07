//! One-sided upper CUSUM chart (Page, 1954)
//!
//! `S_t = max(0, S_{t-1} + (x_t - mean) / std - k)` with mean and std from the
//! rolling baseline preceding each week. A week is flagged when `S_t > h`.
//! The sum is not reset after a signal, so a sustained shift keeps alerting.

use crate::algorithm::detection::Detector;
use crate::algorithm::detection::baseline::{HistoryWeek, RollingBaseline};
use crate::config::SurveillanceConfig;
use crate::models::{Method, MethodPoint, MethodResult, MethodStatus, WeeklySeries};
use crate::parameters::CusumConfig;

/// CUSUM detector for one request
#[derive(Debug, Clone)]
pub struct CusumDetector {
    params: CusumConfig,
    config: SurveillanceConfig,
}

impl CusumDetector {
    /// Detector with resolved parameters
    #[must_use]
    pub fn new(params: CusumConfig, config: SurveillanceConfig) -> Self {
        Self { params, config }
    }
}

impl Detector for CusumDetector {
    fn detect(&self, series: &WeeklySeries) -> MethodResult {
        let CusumConfig { baseline_n, k, h } = self.params;
        let mut baseline = RollingBaseline::new(baseline_n, &self.config);
        let mut sum = 0.0_f64;
        let mut points = Vec::with_capacity(series.len());

        for (index, bucket) in series.buckets.iter().enumerate() {
            let Some(rate) = bucket.rate else {
                points.push(MethodPoint::unevaluated(bucket.week, sum, bucket.n));
                continue;
            };

            let point = match baseline.current(&self.config) {
                Some(b) => {
                    sum = (sum + (rate - b.mean) / b.std - k).max(0.0);
                    MethodPoint::evaluated(bucket.week, sum, h, bucket.n)
                }
                None => MethodPoint::unevaluated(bucket.week, sum, bucket.n),
            };
            baseline.record(
                HistoryWeek {
                    index,
                    rate,
                    n: bucket.n,
                },
                point.alert,
            );
            points.push(point);
        }

        MethodResult::from_points(Method::Cusum, points, MethodStatus::InsufficientData)
    }
}
