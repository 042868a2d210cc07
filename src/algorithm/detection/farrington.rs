//! Farrington-style historical comparison
//!
//! The expected rate for a week is the pooled proportion of flagged results
//! over a historical reference set, and the threshold allows for
//! overdispersion the way Farrington et al. (1996) do for counts:
//!
//! ```text
//! p     = sum(flagged_i) / sum(n_i)
//! phi   = max(1, sum((y_i - n_i p)^2 / (n_i p (1 - p))) / (m - 1))
//! UCL_t = p + z * sqrt(phi * p (1 - p) / n_t)
//! ```
//!
//! The reference set is the same season (± `seasonal_half_window` weeks) of
//! earlier years when the series is long enough to provide `baselineWeeks`
//! such weeks, otherwise the trailing `baselineWeeks` in-control weeks. With
//! fewer usable weeks than that the week is reported as insufficient history.

use crate::algorithm::detection::Detector;
use crate::algorithm::detection::baseline::HistoryWeek;
use crate::config::SurveillanceConfig;
use crate::models::{Method, MethodPoint, MethodResult, MethodStatus, WeeklySeries};
use crate::parameters::FarringtonConfig;

/// Mean ISO-year length in weeks
const WEEKS_PER_YEAR: f64 = 52.1775;

/// Expected rate and dispersion from a reference set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Expected {
    /// Pooled proportion
    pub rate: f64,
    /// Overdispersion factor, at least 1
    pub dispersion: f64,
    /// Observations in the reference set
    pub total_n: f64,
    /// Whether the reference set came from earlier seasons
    pub seasonal: bool,
}

impl Expected {
    /// Pooled estimate over a reference set; `None` when it holds no observations
    #[must_use]
    pub fn from_reference(reference: &[HistoryWeek], seasonal: bool) -> Option<Self> {
        let total_n: f64 = reference.iter().map(|w| f64::from(w.n)).sum();
        if total_n <= 0.0 {
            return None;
        }
        let flagged: f64 = reference.iter().map(|w| w.rate * f64::from(w.n)).sum();
        let rate = (flagged / total_n).clamp(0.0, 1.0);

        let dispersion = if rate > 0.0 && rate < 1.0 && reference.len() > 1 {
            let chi_sq: f64 = reference
                .iter()
                .filter(|w| w.n > 0)
                .map(|w| {
                    let n = f64::from(w.n);
                    (w.rate * n - n * rate).powi(2) / (n * rate * (1.0 - rate))
                })
                .sum();
            (chi_sq / (reference.len() - 1) as f64).max(1.0)
        } else {
            1.0
        };

        Some(Self {
            rate,
            dispersion,
            total_n,
            seasonal,
        })
    }
}

/// Farrington-style detector for one request
#[derive(Debug, Clone)]
pub struct FarringtonDetector {
    params: FarringtonConfig,
    config: SurveillanceConfig,
}

impl FarringtonDetector {
    /// Detector with resolved parameters
    #[must_use]
    pub fn new(params: FarringtonConfig, config: SurveillanceConfig) -> Self {
        Self { params, config }
    }

    /// Upper limit on the observed rate of a week with `n` observations
    #[must_use]
    pub fn upper_limit(&self, expected: &Expected, n: u32) -> f64 {
        // Zero expected rate: half an event over the reference set
        let p = if expected.rate > 0.0 {
            expected.rate
        } else {
            0.5 / expected.total_n
        };
        if p >= 1.0 {
            return 1.0;
        }
        let spread = (expected.dispersion * p * (1.0 - p) / f64::from(n.max(1)))
            .sqrt()
            .max(self.config.sigma_floor);
        p + self.params.z * spread
    }

    /// Reference weeks for the week at `index`, and whether they are seasonal
    fn reference(&self, history: &[HistoryWeek], index: usize) -> Option<(Vec<HistoryWeek>, bool)> {
        let required = self.params.baseline_weeks.max(1);
        let half_window = f64::from(self.config.seasonal_half_window) + 0.5;

        let seasonal: Vec<HistoryWeek> = history
            .iter()
            .filter(|w| {
                let lag = (index - w.index) as f64;
                let years = (lag / WEEKS_PER_YEAR).round();
                years >= 1.0 && (lag - years * WEEKS_PER_YEAR).abs() <= half_window
            })
            .copied()
            .collect();
        if seasonal.len() >= required {
            return Some((seasonal, true));
        }

        if history.len() >= required {
            let trailing = history[history.len() - required..].to_vec();
            return Some((trailing, false));
        }

        None
    }
}

impl Detector for FarringtonDetector {
    fn detect(&self, series: &WeeklySeries) -> MethodResult {
        let mut history: Vec<HistoryWeek> = Vec::with_capacity(series.len());
        let mut points = Vec::with_capacity(series.len());
        let mut last_rate = 0.0;

        for (index, bucket) in series.buckets.iter().enumerate() {
            let Some(rate) = bucket.rate else {
                points.push(MethodPoint::unevaluated(bucket.week, last_rate, bucket.n));
                continue;
            };
            last_rate = rate;

            let expected = self
                .reference(&history, index)
                .and_then(|(reference, seasonal)| Expected::from_reference(&reference, seasonal));

            let point = match expected {
                Some(expected) => MethodPoint::evaluated(
                    bucket.week,
                    rate,
                    self.upper_limit(&expected, bucket.n),
                    bucket.n,
                ),
                None => MethodPoint::unevaluated(bucket.week, rate, bucket.n),
            };

            if !(point.alert && self.config.exclude_signal_weeks) {
                history.push(HistoryWeek {
                    index,
                    rate,
                    n: bucket.n,
                });
            }
            points.push(point);
        }

        MethodResult::from_points(Method::Farrington, points, MethodStatus::InsufficientHistory)
    }
}
