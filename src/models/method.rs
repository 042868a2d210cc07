//! Detector identities and their per-week output

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::SurveillanceError;
use crate::models::week::WeekKey;

/// Surveillance method
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Exponentially weighted moving average chart
    Ewma,
    /// Cumulative sum chart
    Cusum,
    /// Farrington-style historical baseline comparison
    Farrington,
}

impl Method {
    /// All methods in canonical order
    pub const ALL: [Self; 3] = [Self::Ewma, Self::Cusum, Self::Farrington];

    /// Lowercase method name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ewma => "ewma",
            Self::Cusum => "cusum",
            Self::Farrington => "farrington",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = SurveillanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ewma" => Ok(Self::Ewma),
            "cusum" => Ok(Self::Cusum),
            "farrington" => Ok(Self::Farrington),
            other => Err(SurveillanceError::UnknownMethod(other.to_string())),
        }
    }
}

/// A de-duplicated set of requested methods in canonical order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSelection(SmallVec<[Method; 3]>);

impl MethodSelection {
    /// Every method
    #[must_use]
    pub fn all() -> Self {
        Self(SmallVec::from_buf(Method::ALL))
    }

    /// Selection from any list of methods; duplicates collapse
    pub fn from_methods(methods: impl IntoIterator<Item = Method>) -> Self {
        let mut selected: SmallVec<[Method; 3]> = methods.into_iter().collect();
        selected.sort_unstable();
        selected.dedup();
        Self(selected)
    }

    /// Parse a comma separated list such as `ewma,cusum`. An empty list selects every method.
    pub fn parse(list: &str) -> Result<Self, SurveillanceError> {
        let methods = list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Method>, _>>()?;

        if methods.is_empty() {
            Ok(Self::all())
        } else {
            Ok(Self::from_methods(methods))
        }
    }

    /// Whether `method` was requested
    #[must_use]
    pub fn contains(&self, method: Method) -> bool {
        self.0.contains(&method)
    }

    /// Requested methods in canonical order
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.0
    }

    /// Number of requested methods
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was requested
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for MethodSelection {
    fn default() -> Self {
        Self::all()
    }
}

/// Whether a detector could evaluate the latest week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MethodStatus {
    /// The latest point has a control limit
    Evaluated,
    /// The series is empty or too short for a baseline
    InsufficientData,
    /// Fewer usable historical weeks than the method's baseline requires
    InsufficientHistory,
}

impl MethodStatus {
    /// Whether the method produced a usable latest point
    #[must_use]
    pub const fn is_evaluated(self) -> bool {
        matches!(self, Self::Evaluated)
    }
}

/// One week of detector output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodPoint {
    /// ISO week
    pub week: WeekKey,
    /// Detector statistic (EWMA value, CUSUM sum, observed rate)
    pub statistic: f64,
    /// Upper control limit, `None` when no baseline was available
    pub control_limit: Option<f64>,
    /// Whether the statistic exceeded the control limit
    pub alert: bool,
    /// Observations contributing to the week
    pub n: u32,
}

impl MethodPoint {
    /// Point without a control limit
    #[must_use]
    pub const fn unevaluated(week: WeekKey, statistic: f64, n: u32) -> Self {
        Self {
            week,
            statistic,
            control_limit: None,
            alert: false,
            n,
        }
    }

    /// Point compared against a control limit
    #[must_use]
    pub fn evaluated(week: WeekKey, statistic: f64, control_limit: f64, n: u32) -> Self {
        Self {
            week,
            statistic,
            control_limit: Some(control_limit),
            alert: statistic > control_limit,
            n,
        }
    }
}

/// Full output of one detector over one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodResult {
    /// Detector that produced the points
    pub method: Method,
    /// Outcome for the most recent week
    pub status: MethodStatus,
    /// One point per week of the input series, oldest first
    pub points: Vec<MethodPoint>,
}

impl MethodResult {
    /// Result whose status is derived from its latest point
    #[must_use]
    pub fn from_points(method: Method, points: Vec<MethodPoint>, short_status: MethodStatus) -> Self {
        let status = match points.last() {
            Some(point) if point.control_limit.is_some() => MethodStatus::Evaluated,
            Some(_) => short_status,
            None => MethodStatus::InsufficientData,
        };
        Self {
            method,
            status,
            points,
        }
    }

    /// Most recent point
    #[must_use]
    pub fn latest(&self) -> Option<&MethodPoint> {
        self.points.last()
    }

    /// Number of weeks flagged anywhere in the series
    #[must_use]
    pub fn alert_weeks(&self) -> usize {
        self.points.iter().filter(|p| p.alert).count()
    }
}
