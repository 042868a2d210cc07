//! Interpretation of detector output
//!
//! Classifies the most recent week of a [`MethodResult`] by the ratio
//! `r = statistic / controlLimit`:
//!
//! | r            | alert level | risk band |
//! |--------------|-------------|-----------|
//! | `r > 1.00`   | alert       | alert     |
//! | `0.85..=1.00`| watch       | watch     |
//! | `0.70 < r < 0.85` | info   | guarded   |
//! | `r <= 0.70`  | info        | stable    |
//!
//! A missing control limit never raises an error: the method is marked as
//! not evaluated, at `info` with `low` confidence.

use crate::models::{
    AlertLevel, ConfidenceLevel, Interpretation, MethodPoint, MethodResult, RiskBand,
};

/// Ratio above which a method alerts
pub const ALERT_RATIO: f64 = 1.0;
/// Lowest ratio classified as watch
pub const WATCH_RATIO: f64 = 0.85;
/// Ratio above which the risk band is guarded
pub const GUARDED_RATIO: f64 = 0.70;

/// Weeks of series needed for high confidence
pub const HIGH_CONFIDENCE_WEEKS: usize = 8;
/// Latest-week sample size needed for high confidence
pub const HIGH_CONFIDENCE_N: u32 = 20;
/// Weeks of series needed for medium confidence
pub const MEDIUM_CONFIDENCE_WEEKS: usize = 4;
/// Latest-week sample size needed for medium confidence
pub const MEDIUM_CONFIDENCE_N: u32 = 10;

/// Three-state alert level for a ratio
#[must_use]
pub fn alert_level(ratio: f64) -> AlertLevel {
    if ratio > ALERT_RATIO {
        AlertLevel::Alert
    } else if ratio >= WATCH_RATIO {
        AlertLevel::Watch
    } else {
        AlertLevel::Info
    }
}

/// Four-band risk score for a ratio
#[must_use]
pub fn risk_band(ratio: f64) -> RiskBand {
    if ratio > ALERT_RATIO {
        RiskBand::Alert
    } else if ratio >= WATCH_RATIO {
        RiskBand::Watch
    } else if ratio > GUARDED_RATIO {
        RiskBand::Guarded
    } else {
        RiskBand::Stable
    }
}

/// Confidence from series length and the latest week's sample size
#[must_use]
pub const fn confidence(weeks: usize, latest_n: u32) -> ConfidenceLevel {
    if weeks >= HIGH_CONFIDENCE_WEEKS && latest_n >= HIGH_CONFIDENCE_N {
        ConfidenceLevel::High
    } else if weeks >= MEDIUM_CONFIDENCE_WEEKS && latest_n >= MEDIUM_CONFIDENCE_N {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

/// Ratio of a point, when its control limit is usable
fn ratio(point: &MethodPoint) -> Option<f64> {
    let limit = point.control_limit?;
    if !limit.is_finite() || limit <= 0.0 || !point.statistic.is_finite() {
        return None;
    }
    Some(point.statistic / limit)
}

/// Interpret the most recent week of a detector's output
#[must_use]
pub fn interpret(result: &MethodResult) -> Interpretation {
    let latest = result.latest();
    let Some((point, r)) = latest.and_then(|p| ratio(p).map(|r| (p, r))) else {
        return Interpretation {
            method: result.method,
            evaluated: false,
            week: latest.map(|p| p.week),
            ratio: None,
            alert_level: AlertLevel::Info,
            risk_band: RiskBand::Stable,
            confidence_level: ConfidenceLevel::Low,
        };
    };

    Interpretation {
        method: result.method,
        evaluated: true,
        week: Some(point.week),
        ratio: Some(r),
        alert_level: alert_level(r),
        risk_band: risk_band(r),
        confidence_level: confidence(result.points.len(), point.n),
    }
}
