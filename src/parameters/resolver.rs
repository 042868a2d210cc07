//! Parameter governance
//!
//! Turns a preset name, an `advanced` flag and optional raw overrides into a
//! [`SensitivityConfig`] that always lies inside [`BOUNDS`](super::BOUNDS).
//! Nothing here fails: unknown presets fall back to the default, invalid
//! overrides fall back to the preset value and out-of-range overrides are
//! clamped. Every such adjustment is reported for audit.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::parameters::bounds::ParameterField;
use crate::parameters::sensitivity::{DEFAULT_PRESET, Preset, SensitivityConfig};

/// Raw override as received from a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OverrideValue {
    /// Already numeric
    Number(f64),
    /// Text still to be parsed (query strings, form fields)
    Text(String),
}

impl OverrideValue {
    /// Numeric value, if the override is a finite number
    #[must_use]
    pub fn as_finite(&self) -> Option<f64> {
        let value = match self {
            Self::Number(v) => *v,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for OverrideValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for OverrideValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Optional raw overrides keyed by field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterOverrides(BTreeMap<ParameterField, OverrideValue>);

impl ParameterOverrides {
    /// No overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the override for one field
    #[must_use]
    pub fn with(mut self, field: ParameterField, value: impl Into<OverrideValue>) -> Self {
        self.0.insert(field, value.into());
        self
    }

    /// Collect overrides from name/value pairs such as query parameters.
    ///
    /// Names that are not one of the eight tunable fields are skipped.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut overrides = Self::new();
        for (name, value) in pairs {
            match name.parse::<ParameterField>() {
                Ok(field) => {
                    overrides.0.insert(field, OverrideValue::from(value));
                }
                Err(_) => debug!("Skipping unknown parameter override {name}={value}"),
            }
        }
        overrides
    }

    /// Override for one field
    #[must_use]
    pub fn get(&self, field: ParameterField) -> Option<&OverrideValue> {
        self.0.get(&field)
    }

    /// Whether no override was supplied
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Caller request for detector parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterRequest {
    /// Requested preset name; unknown or missing names use the default
    pub preset: Option<String>,
    /// Whether overrides are honoured at all
    pub advanced: bool,
    /// Raw per-field overrides
    pub overrides: ParameterOverrides,
}

impl ParameterRequest {
    /// Request for a named preset without overrides
    pub fn preset(name: impl Into<String>) -> Self {
        Self {
            preset: Some(name.into()),
            ..Self::default()
        }
    }

    /// Request in advanced mode with the given overrides
    #[must_use]
    pub fn advanced(preset: Option<&str>, overrides: ParameterOverrides) -> Self {
        Self {
            preset: preset.map(str::to_string),
            advanced: true,
            overrides,
        }
    }
}

/// Why a resolved value differs from what was asked for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ParameterAdjustment {
    /// Override was outside the bounds and was pinned to the nearest edge
    Clamped {
        /// Field concerned
        field: ParameterField,
        /// Value the caller asked for
        requested: f64,
        /// Value used
        applied: f64,
    },
    /// Override was not a finite number; the preset value was kept
    Ignored {
        /// Field concerned
        field: ParameterField,
        /// Raw value as received
        raw: String,
    },
}

/// Output of the resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedParameters {
    /// Preset actually used
    pub preset: Preset,
    /// Whether the preset is the committee-approved default
    pub locked: bool,
    /// Whether any override changed a value relative to the preset
    pub overridden: bool,
    /// Detector configuration
    pub config: SensitivityConfig,
    /// Clamped or ignored overrides
    pub adjustments: Vec<ParameterAdjustment>,
}

/// Resolves parameter requests into bounded detector configurations
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterResolver;

impl ParameterResolver {
    /// Create a resolver
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Resolve a request
    #[must_use]
    pub fn resolve(&self, request: &ParameterRequest) -> ResolvedParameters {
        let preset = Preset::from_name_or_default(request.preset.as_deref());
        let base = preset.config();
        let mut config = base;
        let mut adjustments = Vec::new();

        if request.advanced {
            for field in ParameterField::ALL {
                let Some(raw) = request.overrides.get(field) else {
                    continue;
                };
                match resolve_field(field, raw) {
                    FieldOutcome::Applied(value) => field.set(&mut config, value),
                    FieldOutcome::Clamped { requested, applied } => {
                        debug!("Clamped {field} override {requested} to {applied}");
                        field.set(&mut config, applied);
                        adjustments.push(ParameterAdjustment::Clamped {
                            field,
                            requested,
                            applied,
                        });
                    }
                    FieldOutcome::Ignored(raw) => {
                        debug!("Ignored invalid {field} override {raw:?}");
                        adjustments.push(ParameterAdjustment::Ignored { field, raw });
                    }
                }
            }
        }

        ResolvedParameters {
            preset,
            locked: preset == DEFAULT_PRESET,
            overridden: config != base,
            config,
            adjustments,
        }
    }
}

enum FieldOutcome {
    Applied(f64),
    Clamped { requested: f64, applied: f64 },
    Ignored(String),
}

fn resolve_field(field: ParameterField, raw: &OverrideValue) -> FieldOutcome {
    let Some(requested) = raw.as_finite() else {
        let raw = match raw {
            OverrideValue::Number(v) => v.to_string(),
            OverrideValue::Text(s) => s.clone(),
        };
        return FieldOutcome::Ignored(raw);
    };

    let value = if field.is_integer() {
        requested.round()
    } else {
        requested
    };
    let applied = field.bounds().clamp(value);

    if field.bounds().contains(value) {
        FieldOutcome::Applied(applied)
    } else {
        FieldOutcome::Clamped { requested, applied }
    }
}
