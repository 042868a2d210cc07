//! Detector configurations and named sensitivity presets

use std::fmt;

use serde::{Deserialize, Serialize};

/// EWMA chart tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EwmaConfig {
    /// Smoothing factor, weight of the newest week
    pub lambda: f64,
    /// Control-limit width in baseline standard deviations
    #[serde(rename = "L")]
    pub l: f64,
    /// Rolling baseline length in weeks
    pub baseline_n: usize,
}

/// CUSUM chart tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CusumConfig {
    /// Rolling baseline length in weeks
    pub baseline_n: usize,
    /// Allowed slack per week in baseline standard deviations
    pub k: f64,
    /// Decision threshold in baseline standard deviations
    pub h: f64,
}

/// Farrington-style comparison tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarringtonConfig {
    /// Historical weeks required for an expected value
    pub baseline_weeks: usize,
    /// z-score threshold above the expected rate
    pub z: f64,
}

/// Tuning for all three detectors, fixed for the duration of one request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityConfig {
    /// EWMA tuning
    pub ewma: EwmaConfig,
    /// CUSUM tuning
    pub cusum: CusumConfig,
    /// Farrington-style tuning
    pub farrington: FarringtonConfig,
}

/// Named bundle of detector parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Fewer false alarms, slower detection
    Low,
    /// Committee-approved defaults
    Standard,
    /// Faster detection, more false alarms
    High,
}

/// Preset used when none, or an unknown one, is requested
pub const DEFAULT_PRESET: Preset = Preset::Standard;

impl Preset {
    /// Every preset
    pub const ALL: [Self; 3] = [Self::Low, Self::Standard, Self::High];

    /// Parse a preset name, case-insensitively
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "standard" => Some(Self::Standard),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Preset for a requested name, falling back to [`DEFAULT_PRESET`]
    #[must_use]
    pub fn from_name_or_default(name: Option<&str>) -> Self {
        name.and_then(Self::parse).unwrap_or(DEFAULT_PRESET)
    }

    /// Lowercase preset name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Standard => "standard",
            Self::High => "high",
        }
    }

    /// Detector configuration of the preset
    #[must_use]
    pub const fn config(self) -> SensitivityConfig {
        match self {
            Self::Low => SensitivityConfig {
                ewma: EwmaConfig {
                    lambda: 0.2,
                    l: 3.5,
                    baseline_n: 12,
                },
                cusum: CusumConfig {
                    baseline_n: 12,
                    k: 0.75,
                    h: 8.0,
                },
                farrington: FarringtonConfig {
                    baseline_weeks: 12,
                    z: 3.0,
                },
            },
            Self::Standard => SensitivityConfig {
                ewma: EwmaConfig {
                    lambda: 0.3,
                    l: 3.0,
                    baseline_n: 8,
                },
                cusum: CusumConfig {
                    baseline_n: 8,
                    k: 0.5,
                    h: 5.0,
                },
                farrington: FarringtonConfig {
                    baseline_weeks: 8,
                    z: 2.0,
                },
            },
            Self::High => SensitivityConfig {
                ewma: EwmaConfig {
                    lambda: 0.4,
                    l: 2.5,
                    baseline_n: 6,
                },
                cusum: CusumConfig {
                    baseline_n: 6,
                    k: 0.25,
                    h: 3.0,
                },
                farrington: FarringtonConfig {
                    baseline_weeks: 6,
                    z: 1.65,
                },
            },
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        DEFAULT_PRESET
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        DEFAULT_PRESET.config()
    }
}

impl fmt::Display for SensitivityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sensitivity Configuration:")?;
        writeln!(
            f,
            "  EWMA: lambda={}, L={}, baseline={} weeks",
            self.ewma.lambda, self.ewma.l, self.ewma.baseline_n
        )?;
        writeln!(
            f,
            "  CUSUM: k={}, h={}, baseline={} weeks",
            self.cusum.k, self.cusum.h, self.cusum.baseline_n
        )?;
        writeln!(
            f,
            "  Farrington: z={}, history={} weeks",
            self.farrington.z, self.farrington.baseline_weeks
        )
    }
}
