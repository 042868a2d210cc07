//! Interpretation, data quality and consensus output types

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::method::Method;
use crate::models::week::WeekKey;

/// Three-state alert level used for consensus counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Nothing unusual
    Info,
    /// Close to the control limit
    Watch,
    /// Above the control limit
    Alert,
}

/// Four-band risk score for display and audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    /// ratio <= 0.70
    Stable = 0,
    /// 0.70 < ratio < 0.85
    Guarded = 1,
    /// 0.85 <= ratio <= 1.00
    Watch = 2,
    /// ratio > 1.00
    Alert = 3,
}

impl RiskBand {
    /// Numeric score 0..=3
    #[must_use]
    pub const fn score(self) -> u8 {
        self as u8
    }
}

/// How much weight a signal can bear given the data behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// Short series or small weekly samples
    Low,
    /// At least 4 weeks and 10 observations in the latest week
    Medium,
    /// At least 8 weeks and 20 observations in the latest week
    High,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// Classification of one detector's most recent week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interpretation {
    /// Detector being interpreted
    pub method: Method,
    /// Whether the latest point had a control limit; unevaluated methods
    /// are left out of consensus counts
    pub evaluated: bool,
    /// Week of the latest point
    pub week: Option<WeekKey>,
    /// `statistic / controlLimit` for the latest point
    pub ratio: Option<f64>,
    /// Three-state level
    pub alert_level: AlertLevel,
    /// Four-band score
    pub risk_band: RiskBand,
    /// Confidence in the classification
    pub confidence_level: ConfidenceLevel,
}

/// Fitness-for-use summary of the data behind a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    /// Total usable observations in the series
    pub overall_n: u64,
    /// Most weekly points produced by any method run
    pub weeks_coverage: usize,
    /// Observations in the most recent week
    pub recent_n: Option<u32>,
    /// `overall_n < 20`
    pub small_n: bool,
    /// `0 < weeks_coverage < 4`
    pub sparse_series: bool,
}

impl DataQuality {
    /// Whether the data are too thin to support an `alert` decision
    #[must_use]
    pub const fn is_insufficient(&self) -> bool {
        self.overall_n < crate::algorithm::quality::MIN_OVERALL_N
            || self.weeks_coverage < crate::algorithm::quality::MIN_WEEKS_COVERAGE
    }
}

/// Reconciled outcome across methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// No method signals
    Stable,
    /// One method alerts or at least one is on watch
    Attention,
    /// Two or more methods alert
    Alert,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stable => "stable",
            Self::Attention => "attention",
            Self::Alert => "alert",
        })
    }
}

/// Alert and watch counts over the methods that took part
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusCounts {
    /// Methods at `alert`
    pub alert: usize,
    /// Methods at `watch`
    pub watch: usize,
}

/// Per-method summary carried in the consensus output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodVerdict {
    /// Three-state level
    pub alert_level: AlertLevel,
    /// Confidence in the level
    pub confidence_level: ConfidenceLevel,
}

/// Final reconciled signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusDecision {
    /// Reconciled decision after any data-quality downgrade
    pub decision: Decision,
    /// Ensemble confidence
    pub confidence: ConfidenceLevel,
    /// Alert/watch counts over participating methods
    pub counts: ConsensusCounts,
    /// Verdict of every participating method; unevaluated ones are only in `excluded_methods`
    pub per_method: BTreeMap<Method, MethodVerdict>,
    /// Requested methods that could not be evaluated
    pub excluded_methods: Vec<Method>,
    /// Data quality the decision was made on
    pub data_quality: DataQuality,
    /// Whether an `alert` was downgraded for data quality
    pub downgraded: bool,
    /// Explanatory notes
    pub notes: Vec<String>,
}
