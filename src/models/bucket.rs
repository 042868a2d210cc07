//! Weekly buckets and the gap-free series built from them

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SurveillanceError};
use crate::models::observation::{AgeBand, Sex};
use crate::models::week::WeekKey;

/// Identity of one weekly series
///
/// `sex` and `age_band` are `None` for the pooled series covering every stratum.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesKey {
    /// Reporting scope
    pub scope_id: String,
    /// Laboratory test code
    pub test_code: String,
    /// Sex stratum, `None` for all
    pub sex: Option<Sex>,
    /// Age stratum, `None` for all
    pub age_band: Option<AgeBand>,
}

impl SeriesKey {
    /// Key of the pooled series for one scope and test
    pub fn pooled(scope_id: impl Into<String>, test_code: impl Into<String>) -> Self {
        Self {
            scope_id: scope_id.into(),
            test_code: test_code.into(),
            sex: None,
            age_band: None,
        }
    }

    /// Same scope and test, restricted to one stratum
    #[must_use]
    pub fn stratum(&self, sex: Option<Sex>, age_band: Option<AgeBand>) -> Self {
        Self {
            scope_id: self.scope_id.clone(),
            test_code: self.test_code.clone(),
            sex,
            age_band,
        }
    }

    /// Whether this key covers every stratum
    #[must_use]
    pub const fn is_pooled(&self) -> bool {
        self.sex.is_none() && self.age_band.is_none()
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.scope_id,
            self.test_code,
            self.sex.map_or("all", Sex::label),
            self.age_band.map_or("all", AgeBand::label)
        )
    }
}

/// Aggregated counts for one week of one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyBucket {
    /// ISO week
    pub week: WeekKey,
    /// Observations collected in the week
    pub n: u32,
    /// Observations meeting the signal's abnormality rule
    pub flagged_count: u32,
    /// `flagged_count / n`, `None` for a week without observations
    pub rate: Option<f64>,
}

impl WeeklyBucket {
    /// Bucket from raw counts
    #[must_use]
    pub fn from_counts(week: WeekKey, n: u32, flagged_count: u32) -> Self {
        let flagged_count = flagged_count.min(n);
        let rate = (n > 0).then(|| f64::from(flagged_count) / f64::from(n));
        Self {
            week,
            n,
            flagged_count,
            rate,
        }
    }

    /// A week with no observations
    #[must_use]
    pub const fn empty(week: WeekKey) -> Self {
        Self {
            week,
            n: 0,
            flagged_count: 0,
            rate: None,
        }
    }

    /// Bucket from a pre-computed rate, as delivered by external rate series.
    ///
    /// `flagged_count` is the rounded implied count; detectors read `rate`.
    pub fn with_rate(week: WeekKey, n: u32, rate: f64) -> Result<Self> {
        if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
            return Err(SurveillanceError::ContractViolation(format!(
                "rate {rate} for {week} is not a proportion"
            )));
        }
        if n == 0 {
            return Ok(Self::empty(week));
        }
        // Rounded count is at most n because rate <= 1
        let flagged_count = (rate * f64::from(n)).round() as u32;
        Ok(Self {
            week,
            n,
            flagged_count,
            rate: Some(rate),
        })
    }
}

/// A contiguous, gap-filled weekly series for one key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySeries {
    /// Series identity
    pub key: SeriesKey,
    /// One bucket per week, oldest first, no gaps
    pub buckets: Vec<WeeklyBucket>,
    /// Observations that could not be judged (unknown unit) and were left out
    pub skipped: usize,
}

impl WeeklySeries {
    /// Series with no observations
    #[must_use]
    pub const fn empty(key: SeriesKey) -> Self {
        Self {
            key,
            buckets: Vec::new(),
            skipped: 0,
        }
    }

    /// Build a series from already ordered buckets, filling any missing weeks
    #[must_use]
    pub fn from_buckets(key: SeriesKey, buckets: Vec<WeeklyBucket>) -> Self {
        let (Some(first), Some(last)) = (
            buckets.iter().map(|b| b.week).min(),
            buckets.iter().map(|b| b.week).max(),
        ) else {
            return Self::empty(key);
        };

        let mut by_week: std::collections::BTreeMap<WeekKey, WeeklyBucket> =
            buckets.into_iter().map(|b| (b.week, b)).collect();
        let buckets = first
            .through(last)
            .map(|week| by_week.remove(&week).unwrap_or_else(|| WeeklyBucket::empty(week)))
            .collect();

        Self {
            key,
            buckets,
            skipped: 0,
        }
    }

    /// Number of weeks in the series
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether the series has no weeks at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total observations across all weeks
    #[must_use]
    pub fn total_n(&self) -> u64 {
        self.buckets.iter().map(|b| u64::from(b.n)).sum()
    }

    /// Total flagged observations across all weeks
    #[must_use]
    pub fn total_flagged(&self) -> u64 {
        self.buckets.iter().map(|b| u64::from(b.flagged_count)).sum()
    }

    /// Most recent bucket
    #[must_use]
    pub fn latest(&self) -> Option<&WeeklyBucket> {
        self.buckets.last()
    }

    /// Whether consecutive buckets are exactly one week apart
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        self.buckets
            .windows(2)
            .all(|pair| pair[0].week.next() == pair[1].week)
    }
}
