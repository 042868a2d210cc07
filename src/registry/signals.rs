//! Static signal registry
//!
//! Each surveillance signal ties a laboratory test to the clinical rule that
//! marks a result as abnormal, plus the descriptive metadata reports show.
//! The table is a compile-time constant and is never mutated.

use std::fmt;

use crate::error::{Result, SurveillanceError};
use crate::models::observation::{AgeBand, Observation, Sex};

/// Linear conversion from a reported unit into a signal's canonical unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConversion {
    /// Reported unit, compared case- and whitespace-insensitively
    pub unit: &'static str,
    /// Multiplier applied to the reported value
    pub scale: f64,
    /// Offset added after scaling
    pub offset: f64,
}

impl UnitConversion {
    const fn scale(unit: &'static str, scale: f64) -> Self {
        Self {
            unit,
            scale,
            offset: 0.0,
        }
    }

    const fn affine(unit: &'static str, scale: f64, offset: f64) -> Self {
        Self {
            unit,
            scale,
            offset,
        }
    }
}

/// Abnormality rule applied to a value in the canonical unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlagRule {
    /// Flag values strictly below the threshold
    Below(f64),
    /// Flag values at or above the threshold
    AtLeast(f64),
    /// Flag values strictly below an age- and sex-specific threshold
    SexAgeBelow {
        /// Threshold for children aged 0-4
        under5: f64,
        /// Threshold for children aged 5-14
        age5_14: f64,
        /// Threshold for women aged 15 and over
        female: f64,
        /// Threshold for men aged 15 and over
        male: f64,
    },
}

impl FlagRule {
    /// Whether a canonical-unit value is abnormal for the given person
    ///
    /// Adults of unknown sex use the lower (female) threshold and unknown
    /// ages are treated as adult, so missing demographics never add flags.
    #[must_use]
    pub fn is_flagged(&self, value: f64, sex: Sex, age_band: Option<AgeBand>) -> bool {
        match *self {
            Self::Below(threshold) => value < threshold,
            Self::AtLeast(threshold) => value >= threshold,
            Self::SexAgeBelow {
                under5,
                age5_14,
                female,
                male,
            } => {
                let threshold = match (age_band, sex) {
                    (Some(AgeBand::Under5), _) => under5,
                    (Some(AgeBand::Age5To14), _) => age5_14,
                    (_, Sex::Male) => male,
                    (_, Sex::Female | Sex::Unknown) => female,
                };
                value < threshold
            }
        }
    }
}

/// Registered surveillance signal
#[derive(Debug, Clone, PartialEq)]
pub struct SignalDefinition {
    /// Signal id, e.g. `anemia`
    pub id: &'static str,
    /// Laboratory test the signal is computed from
    pub test_code: &'static str,
    /// Short display label
    pub label: &'static str,
    /// Unit the rule thresholds are expressed in
    pub canonical_unit: &'static str,
    /// Accepted alternative units
    pub conversions: &'static [UnitConversion],
    /// Abnormality rule
    pub rule: FlagRule,
    /// What a rising rate means
    pub description: &'static str,
    /// Suggested follow-up when the signal is raised
    pub recommended_actions: &'static [&'static str],
}

impl SignalDefinition {
    /// Convert a reported value into the canonical unit.
    ///
    /// An empty unit is taken as canonical. Unknown units return `None`.
    #[must_use]
    pub fn canonical_value(&self, value: f64, unit: &str) -> Option<f64> {
        let unit = normalize_unit(unit);
        if unit.is_empty() || unit == normalize_unit(self.canonical_unit) {
            return Some(value);
        }
        self.conversions
            .iter()
            .find(|c| normalize_unit(c.unit) == unit)
            .map(|c| value * c.scale + c.offset)
    }

    /// Whether an observation is abnormal, `None` if its unit cannot be judged
    #[must_use]
    pub fn is_flagged(&self, observation: &Observation) -> Option<bool> {
        self.canonical_value(observation.value, &observation.unit)
            .map(|value| self.rule.is_flagged(value, observation.sex, observation.age_band()))
    }
}

impl fmt::Display for SignalDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.label, self.test_code, self.canonical_unit)
    }
}

fn normalize_unit(unit: &str) -> String {
    unit.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '²' { '2' } else { c })
        .collect::<String>()
        .to_ascii_lowercase()
}

const SIGNALS: &[SignalDefinition] = &[
    SignalDefinition {
        id: "anemia",
        test_code: "HGB",
        label: "Anemia",
        canonical_unit: "g/dL",
        conversions: &[
            UnitConversion::scale("g/L", 0.1),
            UnitConversion::scale("mmol/L", 1.611),
        ],
        rule: FlagRule::SexAgeBelow {
            under5: 11.0,
            age5_14: 11.5,
            female: 12.0,
            male: 13.0,
        },
        description: "Share of hemoglobin results below the WHO age- and sex-specific anemia threshold",
        recommended_actions: &[
            "Review iron supplementation coverage in the affected scope",
            "Check for concurrent malaria or helminth reports",
            "Confirm analyzer calibration before escalating",
        ],
    },
    SignalDefinition {
        id: "hyperglycemia",
        test_code: "HBA1C",
        label: "Hyperglycemia",
        canonical_unit: "%",
        conversions: &[UnitConversion::affine("mmol/mol", 0.091_48, 2.152)],
        rule: FlagRule::AtLeast(6.5),
        description: "Share of HbA1c results in the diabetic range",
        recommended_actions: &[
            "Compare against diabetes screening campaign schedules",
            "Notify the non-communicable disease programme",
        ],
    },
    SignalDefinition {
        id: "ckd",
        test_code: "EGFR",
        label: "Reduced kidney function",
        canonical_unit: "mL/min/1.73m2",
        conversions: &[UnitConversion::scale("mL/min", 1.0)],
        rule: FlagRule::Below(60.0),
        description: "Share of eGFR results below 60 mL/min/1.73m2",
        recommended_actions: &[
            "Review nephrotoxic drug exposure and dehydration reports",
            "Cross-check creatinine assay changes at contributing labs",
        ],
    },
    SignalDefinition {
        id: "vitamin_d_deficiency",
        test_code: "VITD",
        label: "Vitamin D deficiency",
        canonical_unit: "ng/mL",
        conversions: &[UnitConversion::scale("nmol/L", 0.4)],
        rule: FlagRule::Below(20.0),
        description: "Share of 25-OH vitamin D results below 20 ng/mL",
        recommended_actions: &[
            "Account for seasonal variation before escalating",
            "Review supplementation guidance for at-risk groups",
        ],
    },
    SignalDefinition {
        id: "hypercholesterolemia",
        test_code: "LDL",
        label: "High LDL cholesterol",
        canonical_unit: "mg/dL",
        conversions: &[UnitConversion::scale("mmol/L", 38.67)],
        rule: FlagRule::AtLeast(160.0),
        description: "Share of LDL cholesterol results at or above 160 mg/dL",
        recommended_actions: &["Notify the cardiovascular risk programme"],
    },
];

/// Every registered signal
#[must_use]
pub fn signals() -> &'static [SignalDefinition] {
    SIGNALS
}

/// Look up a signal by id (case-insensitive)
pub fn signal(id: &str) -> Result<&'static SignalDefinition> {
    SIGNALS
        .iter()
        .find(|s| s.id.eq_ignore_ascii_case(id.trim()))
        .ok_or_else(|| SurveillanceError::UnknownSignal(id.to_string()))
}

/// Look up the signal computed from a test code (case-insensitive)
pub fn signal_for_test(test_code: &str) -> Result<&'static SignalDefinition> {
    SIGNALS
        .iter()
        .find(|s| s.test_code.eq_ignore_ascii_case(test_code.trim()))
        .ok_or_else(|| SurveillanceError::UnknownSignal(test_code.to_string()))
}
