//! Engine configuration
//!
//! Process-level knobs for the surveillance pipeline. Detector tuning is
//! not here: it is resolved per request into a
//! [`SensitivityConfig`](crate::parameters::SensitivityConfig).

use std::fmt;
use std::str::FromStr;

use crate::utils::logging::log_warning;

/// Prefix of the environment variables read by [`SurveillanceConfig::from_env`]
pub const ENV_PREFIX: &str = "LAB_SURVEILLANCE_";

/// Configuration for the surveillance pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct SurveillanceConfig {
    /// Fewest usable preceding weeks before EWMA/CUSUM emit a control limit
    pub min_baseline_weeks: usize,
    /// Absolute floor for any baseline standard deviation
    pub sigma_floor: f64,
    /// Floor baseline standard deviations at the binomial `sqrt(p(1-p)/n)`
    pub use_binomial_floor: bool,
    /// Leave weeks a detector has flagged out of its later baselines
    pub exclude_signal_weeks: bool,
    /// Half width, in weeks, of the same-season window for historical comparison
    pub seasonal_half_window: u32,
    /// Whether to run methods and strata in parallel
    pub use_parallel: bool,
}

impl Default for SurveillanceConfig {
    fn default() -> Self {
        Self {
            min_baseline_weeks: 4,
            sigma_floor: 1e-3,
            use_binomial_floor: true,
            exclude_signal_weeks: true,
            seasonal_half_window: 3,
            use_parallel: true,
        }
    }
}

impl SurveillanceConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new builder for constructing the configuration
    #[must_use]
    pub fn builder() -> SurveillanceConfigBuilder {
        SurveillanceConfigBuilder::new()
    }

    /// Defaults overlaid with `LAB_SURVEILLANCE_*` environment variables.
    ///
    /// Unparseable values are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with values from an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let read = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}"));

        if let Some(v) = parse_var::<usize>("MIN_BASELINE_WEEKS", read("MIN_BASELINE_WEEKS")) {
            config.min_baseline_weeks = v.max(2);
        }
        if let Some(v) = parse_var::<f64>("SIGMA_FLOOR", read("SIGMA_FLOOR")) {
            if v.is_finite() && v > 0.0 {
                config.sigma_floor = v;
            }
        }
        if let Some(v) = parse_var::<bool>("BINOMIAL_FLOOR", read("BINOMIAL_FLOOR")) {
            config.use_binomial_floor = v;
        }
        if let Some(v) = parse_var::<bool>("EXCLUDE_SIGNAL_WEEKS", read("EXCLUDE_SIGNAL_WEEKS")) {
            config.exclude_signal_weeks = v;
        }
        if let Some(v) = parse_var::<u32>("SEASONAL_HALF_WINDOW", read("SEASONAL_HALF_WINDOW")) {
            config.seasonal_half_window = v.min(8);
        }
        if let Some(v) = parse_var::<bool>("PARALLEL", read("PARALLEL")) {
            config.use_parallel = v;
        }

        config
    }
}

fn parse_var<T: FromStr>(name: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log_warning(&format!("Ignoring {ENV_PREFIX}{name}={raw}: not a valid value"), None);
            None
        }
    }
}

impl fmt::Display for SurveillanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Surveillance Configuration:")?;
        writeln!(f, "  Minimum Baseline Weeks: {}", self.min_baseline_weeks)?;
        writeln!(f, "  Sigma Floor: {}", self.sigma_floor)?;
        writeln!(f, "  Binomial Floor: {}", self.use_binomial_floor)?;
        writeln!(f, "  Exclude Signal Weeks: {}", self.exclude_signal_weeks)?;
        writeln!(f, "  Seasonal Half Window: ±{} weeks", self.seasonal_half_window)?;
        writeln!(f, "  Parallel: {}", self.use_parallel)
    }
}

/// Builder for constructing the surveillance configuration
#[derive(Debug, Clone, Default)]
pub struct SurveillanceConfigBuilder {
    config: SurveillanceConfig,
}

impl SurveillanceConfigBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum number of baseline weeks
    #[must_use]
    pub const fn min_baseline_weeks(mut self, weeks: usize) -> Self {
        self.config.min_baseline_weeks = weeks;
        self
    }

    /// Set the absolute standard deviation floor
    #[must_use]
    pub const fn sigma_floor(mut self, floor: f64) -> Self {
        self.config.sigma_floor = floor;
        self
    }

    /// Set whether to apply the binomial standard deviation floor
    #[must_use]
    pub const fn use_binomial_floor(mut self, enabled: bool) -> Self {
        self.config.use_binomial_floor = enabled;
        self
    }

    /// Set whether flagged weeks are excluded from later baselines
    #[must_use]
    pub const fn exclude_signal_weeks(mut self, enabled: bool) -> Self {
        self.config.exclude_signal_weeks = enabled;
        self
    }

    /// Set the same-season window half width
    #[must_use]
    pub const fn seasonal_half_window(mut self, weeks: u32) -> Self {
        self.config.seasonal_half_window = weeks;
        self
    }

    /// Set whether to use parallel processing
    #[must_use]
    pub const fn use_parallel(mut self, parallel: bool) -> Self {
        self.config.use_parallel = parallel;
        self
    }

    /// Build the configuration
    #[must_use]
    pub const fn build(self) -> SurveillanceConfig {
        self.config
    }
}
