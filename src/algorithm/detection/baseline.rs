//! Rolling baselines shared by the detectors
//!
//! A baseline is re-derived at every point from the usable weeks that precede
//! it. Weeks without observations never enter a baseline, and when
//! `exclude_signal_weeks` is on neither do weeks the detector itself flagged.

use std::collections::VecDeque;

use crate::config::SurveillanceConfig;
use crate::utils::stats::{binomial_std, mean, sample_std};

/// One usable historical week
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryWeek {
    /// Position of the week in the series
    pub index: usize,
    /// Observed rate
    pub rate: f64,
    /// Observations in the week
    pub n: u32,
}

/// Mean and floored standard deviation of a baseline window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    /// Mean weekly rate
    pub mean: f64,
    /// Standard deviation, never below the configured floors
    pub std: f64,
    /// Weeks the estimate rests on
    pub weeks: usize,
}

impl Baseline {
    /// Estimate from a window of history.
    ///
    /// Returns `None` for an empty window. The standard deviation is the
    /// largest of the sample standard deviation, the binomial standard
    /// deviation at the mean weekly sample size (when enabled) and the
    /// absolute floor. The binomial floor keeps the proportion at least half
    /// an event away from 0 and 1 over the window, so an all-zero history
    /// still has a spread that one weekly event can be measured against.
    #[must_use]
    pub fn estimate<'h>(
        window: impl IntoIterator<Item = &'h HistoryWeek>,
        config: &SurveillanceConfig,
    ) -> Option<Self> {
        let (rates, sizes): (Vec<f64>, Vec<f64>) = window
            .into_iter()
            .map(|w| (w.rate, f64::from(w.n)))
            .unzip();

        let mean_rate = mean(&rates)?;
        let mut std = sample_std(&rates).unwrap_or(0.0);
        if config.use_binomial_floor {
            let mean_n = mean(&sizes).unwrap_or(0.0);
            let total_n: f64 = sizes.iter().sum();
            let half_event = if total_n > 0.0 { 0.5 / total_n } else { 0.0 };
            let p = mean_rate.max(half_event).min(1.0 - half_event);
            std = std.max(binomial_std(p, mean_n));
        }
        std = std.max(config.sigma_floor);

        Some(Self {
            mean: mean_rate,
            std,
            weeks: rates.len(),
        })
    }
}

/// Trailing window of in-control weeks
#[derive(Debug, Clone)]
pub struct RollingBaseline {
    history: VecDeque<HistoryWeek>,
    capacity: usize,
    required: usize,
    exclude_signal_weeks: bool,
}

impl RollingBaseline {
    /// Window holding the last `window` usable weeks; a baseline is only
    /// produced once `min(window, config.min_baseline_weeks)` weeks are held.
    #[must_use]
    pub fn new(window: usize, config: &SurveillanceConfig) -> Self {
        let capacity = window.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            required: config.min_baseline_weeks.clamp(2, capacity.max(2)),
            exclude_signal_weeks: config.exclude_signal_weeks,
        }
    }

    /// Baseline for the next point, if enough history is held
    #[must_use]
    pub fn current(&self, config: &SurveillanceConfig) -> Option<Baseline> {
        if self.history.len() < self.required {
            return None;
        }
        Baseline::estimate(self.history.iter(), config)
    }

    /// History currently in the window, oldest first
    pub fn weeks(&self) -> impl Iterator<Item = &HistoryWeek> {
        self.history.iter()
    }

    /// Record a week after it has been evaluated
    pub fn record(&mut self, week: HistoryWeek, flagged: bool) {
        if flagged && self.exclude_signal_weeks {
            return;
        }
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(week);
    }
}
