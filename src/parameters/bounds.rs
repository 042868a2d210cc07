//! Safety rails for detector parameters
//!
//! Every tunable field has a fixed `[min, max]` range. Presets must sit
//! inside it and user overrides are clamped into it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::parameters::SensitivityConfig;

/// Inclusive range for one parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    /// Smallest allowed value
    pub min: f64,
    /// Largest allowed value
    pub max: f64,
}

impl Range {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies in the range
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Nearest value inside the range
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// The eight tunable detector parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParameterField {
    /// EWMA smoothing factor
    #[serde(rename = "ewmaLambda")]
    EwmaLambda,
    /// EWMA control-limit width in baseline standard deviations
    #[serde(rename = "ewmaL")]
    EwmaL,
    /// EWMA rolling baseline length in weeks
    #[serde(rename = "ewmaBaselineN")]
    EwmaBaselineN,
    /// CUSUM rolling baseline length in weeks
    #[serde(rename = "cusumBaselineN")]
    CusumBaselineN,
    /// CUSUM slack in baseline standard deviations
    #[serde(rename = "cusumK")]
    CusumK,
    /// CUSUM decision threshold in baseline standard deviations
    #[serde(rename = "cusumH")]
    CusumH,
    /// Historical weeks required by the Farrington-style comparison
    #[serde(rename = "farringtonBaselineWeeks")]
    FarringtonBaselineWeeks,
    /// z-score threshold of the Farrington-style comparison
    #[serde(rename = "farringtonZ")]
    FarringtonZ,
}

impl ParameterField {
    /// Every field, in a fixed order
    pub const ALL: [Self; 8] = [
        Self::EwmaLambda,
        Self::EwmaL,
        Self::EwmaBaselineN,
        Self::CusumBaselineN,
        Self::CusumK,
        Self::CusumH,
        Self::FarringtonBaselineWeeks,
        Self::FarringtonZ,
    ];

    /// Name used by callers and in audit output
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EwmaLambda => "ewmaLambda",
            Self::EwmaL => "ewmaL",
            Self::EwmaBaselineN => "ewmaBaselineN",
            Self::CusumBaselineN => "cusumBaselineN",
            Self::CusumK => "cusumK",
            Self::CusumH => "cusumH",
            Self::FarringtonBaselineWeeks => "farringtonBaselineWeeks",
            Self::FarringtonZ => "farringtonZ",
        }
    }

    /// Whether the field counts weeks
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::EwmaBaselineN | Self::CusumBaselineN | Self::FarringtonBaselineWeeks
        )
    }

    /// Allowed range of the field
    #[must_use]
    pub const fn bounds(self) -> Range {
        match self {
            Self::EwmaLambda => BOUNDS.ewma_lambda,
            Self::EwmaL => BOUNDS.ewma_l,
            Self::EwmaBaselineN => BOUNDS.ewma_baseline_n,
            Self::CusumBaselineN => BOUNDS.cusum_baseline_n,
            Self::CusumK => BOUNDS.cusum_k,
            Self::CusumH => BOUNDS.cusum_h,
            Self::FarringtonBaselineWeeks => BOUNDS.farrington_baseline_weeks,
            Self::FarringtonZ => BOUNDS.farrington_z,
        }
    }

    /// Current value of the field in a configuration
    #[must_use]
    pub fn get(self, config: &SensitivityConfig) -> f64 {
        match self {
            Self::EwmaLambda => config.ewma.lambda,
            Self::EwmaL => config.ewma.l,
            Self::EwmaBaselineN => config.ewma.baseline_n as f64,
            Self::CusumBaselineN => config.cusum.baseline_n as f64,
            Self::CusumK => config.cusum.k,
            Self::CusumH => config.cusum.h,
            Self::FarringtonBaselineWeeks => config.farrington.baseline_weeks as f64,
            Self::FarringtonZ => config.farrington.z,
        }
    }

    /// Write a value, already inside the bounds, into a configuration
    pub fn set(self, config: &mut SensitivityConfig, value: f64) {
        let weeks = || value.round().max(0.0) as usize;
        match self {
            Self::EwmaLambda => config.ewma.lambda = value,
            Self::EwmaL => config.ewma.l = value,
            Self::EwmaBaselineN => config.ewma.baseline_n = weeks(),
            Self::CusumBaselineN => config.cusum.baseline_n = weeks(),
            Self::CusumK => config.cusum.k = value,
            Self::CusumH => config.cusum.h = value,
            Self::FarringtonBaselineWeeks => config.farrington.baseline_weeks = weeks(),
            Self::FarringtonZ => config.farrington.z = value,
        }
    }
}

impl fmt::Display for ParameterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParameterField {
    type Err = String;

    /// Accepts the camelCase names plus snake_case and dotted spellings
    /// (`ewma_lambda`, `ewma.lambda`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|field| field.name().to_ascii_lowercase() == folded)
            .ok_or_else(|| format!("Unknown parameter: {s}"))
    }
}

/// Bounds for every tunable field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterBounds {
    /// EWMA lambda
    pub ewma_lambda: Range,
    /// EWMA L
    pub ewma_l: Range,
    /// EWMA baseline weeks
    pub ewma_baseline_n: Range,
    /// CUSUM baseline weeks
    pub cusum_baseline_n: Range,
    /// CUSUM k
    pub cusum_k: Range,
    /// CUSUM h
    pub cusum_h: Range,
    /// Farrington historical weeks
    pub farrington_baseline_weeks: Range,
    /// Farrington z
    pub farrington_z: Range,
}

/// Process-wide parameter bounds
pub const BOUNDS: ParameterBounds = ParameterBounds {
    ewma_lambda: Range::new(0.10, 0.50),
    ewma_l: Range::new(2.0, 4.0),
    ewma_baseline_n: Range::new(4.0, 52.0),
    cusum_baseline_n: Range::new(4.0, 52.0),
    cusum_k: Range::new(0.10, 1.00),
    cusum_h: Range::new(2.0, 10.0),
    farrington_baseline_weeks: Range::new(4.0, 26.0),
    farrington_z: Range::new(1.5, 3.5),
};

/// Whether every field of `config` lies inside its bounds
#[must_use]
pub fn within_bounds(config: &SensitivityConfig) -> bool {
    ParameterField::ALL
        .into_iter()
        .all(|field| field.bounds().contains(field.get(config)))
}
