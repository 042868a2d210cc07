//! EWMA control chart (Roberts, 1959)
//!
//! `z_t = lambda * x_t + (1 - lambda) * z_{t-1}` over weekly rates, compared
//! against `UCL = mean + L * std * sqrt(lambda / (2 - lambda))` where mean and
//! std come from the rolling baseline preceding each week.

use crate::algorithm::detection::Detector;
use crate::algorithm::detection::baseline::{HistoryWeek, RollingBaseline};
use crate::config::SurveillanceConfig;
use crate::models::{Method, MethodPoint, MethodResult, MethodStatus, WeeklySeries};
use crate::parameters::EwmaConfig;

/// EWMA detector for one request
#[derive(Debug, Clone)]
pub struct EwmaDetector {
    params: EwmaConfig,
    config: SurveillanceConfig,
}

impl EwmaDetector {
    /// Detector with resolved parameters
    #[must_use]
    pub fn new(params: EwmaConfig, config: SurveillanceConfig) -> Self {
        Self { params, config }
    }

    /// Asymptotic width factor `sqrt(lambda / (2 - lambda))`
    #[must_use]
    pub fn width_factor(&self) -> f64 {
        let lambda = self.params.lambda;
        (lambda / (2.0 - lambda)).sqrt()
    }
}

impl Detector for EwmaDetector {
    fn detect(&self, series: &WeeklySeries) -> MethodResult {
        let lambda = self.params.lambda;
        let width = self.params.l * self.width_factor();
        let mut baseline = RollingBaseline::new(self.params.baseline_n, &self.config);
        let mut smoothed: Option<f64> = None;
        let mut points = Vec::with_capacity(series.len());

        for (index, bucket) in series.buckets.iter().enumerate() {
            let Some(rate) = bucket.rate else {
                // Empty week: the average carries over unchanged
                points.push(MethodPoint::unevaluated(
                    bucket.week,
                    smoothed.unwrap_or(0.0),
                    bucket.n,
                ));
                continue;
            };

            let z = smoothed.map_or(rate, |prev| lambda * rate + (1.0 - lambda) * prev);
            smoothed = Some(z);

            let point = match baseline.current(&self.config) {
                Some(b) => MethodPoint::evaluated(bucket.week, z, b.mean + width * b.std, bucket.n),
                None => MethodPoint::unevaluated(bucket.week, z, bucket.n),
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

        MethodResult::from_points(Method::Ewma, points, MethodStatus::InsufficientData)
    }
}
