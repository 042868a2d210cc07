//! Data-quality evaluation
//!
//! Sample-size and time-coverage metrics computed once per request from the
//! weekly series and the detector output built on it.

use crate::models::{DataQuality, MethodResult, WeeklySeries};

/// Below this many observations an `alert` decision is downgraded
pub const MIN_OVERALL_N: u64 = 20;
/// Below this many weekly points an `alert` decision is downgraded
pub const MIN_WEEKS_COVERAGE: usize = 4;

/// Evaluate data quality for one series and the methods run on it.
///
/// `recent_n` is the latest week's sample size from the first method with
/// points; when no method ran it falls back to the series' latest week.
#[must_use]
pub fn evaluate(series: &WeeklySeries, results: &[MethodResult]) -> DataQuality {
    let overall_n = series.total_n();
    let weeks_coverage = results.iter().map(|r| r.points.len()).max().unwrap_or(0);
    let recent_n = results
        .iter()
        .find_map(|r| r.latest().map(|p| p.n))
        .or_else(|| series.latest().map(|b| b.n));

    DataQuality {
        overall_n,
        weeks_coverage,
        recent_n,
        small_n: overall_n < MIN_OVERALL_N,
        sparse_series: weeks_coverage > 0 && weeks_coverage < MIN_WEEKS_COVERAGE,
    }
}
