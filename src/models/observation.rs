//! Laboratory observations and their demographic strata

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Recorded sex of the tested person
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    /// Female
    Female,
    /// Male
    Male,
    /// Missing or not recorded
    Unknown,
}

impl Sex {
    /// Parse the many spellings found in lab extracts. Anything unrecognised is `Unknown`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "f" | "female" | "w" | "woman" | "k" | "2" => Self::Female,
            "m" | "male" | "man" | "1" => Self::Male,
            _ => Self::Unknown,
        }
    }

    /// Lowercase label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed age bands used for stratification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    /// 0 to 4 years
    #[serde(rename = "0-4")]
    Under5,
    /// 5 to 14 years
    #[serde(rename = "5-14")]
    Age5To14,
    /// 15 to 49 years
    #[serde(rename = "15-49")]
    Age15To49,
    /// 50 years and over
    #[serde(rename = "50+")]
    Age50Plus,
}

impl AgeBand {
    /// Band for an age in (possibly fractional) years. Negative or non-finite ages have no band.
    #[must_use]
    pub fn from_age(age_years: f64) -> Option<Self> {
        if !age_years.is_finite() || age_years < 0.0 {
            return None;
        }
        Some(match age_years {
            a if a < 5.0 => Self::Under5,
            a if a < 15.0 => Self::Age5To14,
            a if a < 50.0 => Self::Age15To49,
            _ => Self::Age50Plus,
        })
    }

    /// Band label as used in week-bucket keys
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Under5 => "0-4",
            Self::Age5To14 => "5-14",
            Self::Age15To49 => "15-49",
            Self::Age50Plus => "50+",
        }
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One laboratory test result
///
/// Observations arrive already validated by ingestion: `value` is finite and
/// `collected_at` is a real date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    /// Reporting scope (facility, district, region)
    pub scope_id: String,
    /// Laboratory test code, e.g. `HGB`
    pub test_code: String,
    /// Numeric result
    pub value: f64,
    /// Unit the value was reported in
    pub unit: String,
    /// Collection date
    pub collected_at: NaiveDate,
    /// Recorded sex
    pub sex: Sex,
    /// Age at collection in years
    pub age_years: Option<f64>,
    /// Nationality, when recorded
    pub nationality: Option<String>,
}

impl Observation {
    /// Age band of the tested person, if the age is known
    #[must_use]
    pub fn age_band(&self) -> Option<AgeBand> {
        self.age_years.and_then(AgeBand::from_age)
    }
}
