//! Anomaly detectors
//!
//! Three independent detectors share one shape: a pure mapping from a weekly
//! series to a [`MethodResult`]. They keep no state between calls and
//! re-derive every baseline from the series they are given.
//!
//! - [`EwmaDetector`] — exponentially weighted moving average chart
//! - [`CusumDetector`] — cumulative sum chart for small sustained shifts
//! - [`FarringtonDetector`] — comparison with historical weeks

pub mod baseline;
pub mod cusum;
pub mod ewma;
pub mod farrington;

pub use baseline::{Baseline, HistoryWeek, RollingBaseline};
pub use cusum::CusumDetector;
pub use ewma::EwmaDetector;
pub use farrington::{Expected, FarringtonDetector};

use rayon::prelude::*;

use crate::config::SurveillanceConfig;
use crate::models::{Method, MethodResult, MethodSelection, WeeklySeries};
use crate::parameters::SensitivityConfig;

/// A surveillance detector
pub trait Detector: Send + Sync {
    /// Run the detector over a full weekly series
    fn detect(&self, series: &WeeklySeries) -> MethodResult;
}

/// Build the detector for `method` from resolved parameters
#[must_use]
pub fn detector_for(
    method: Method,
    params: &SensitivityConfig,
    config: &SurveillanceConfig,
) -> Box<dyn Detector> {
    match method {
        Method::Ewma => Box::new(EwmaDetector::new(params.ewma, config.clone())),
        Method::Cusum => Box::new(CusumDetector::new(params.cusum, config.clone())),
        Method::Farrington => Box::new(FarringtonDetector::new(params.farrington, config.clone())),
    }
}

/// Run every selected method over `series`.
///
/// Results come back in canonical method order whether or not they were
/// computed in parallel.
#[must_use]
pub fn run_methods(
    series: &WeeklySeries,
    selection: &MethodSelection,
    params: &SensitivityConfig,
    config: &SurveillanceConfig,
) -> Vec<MethodResult> {
    let run = |method: &Method| detector_for(*method, params, config).detect(series);

    if config.use_parallel && selection.len() > 1 {
        selection.methods().par_iter().map(run).collect()
    } else {
        selection.methods().iter().map(run).collect()
    }
}
