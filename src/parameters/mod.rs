//! Detector parameters: presets, bounds and the resolver that combines them

pub mod bounds;
pub mod resolver;
pub mod sensitivity;

pub use bounds::{BOUNDS, ParameterBounds, ParameterField, Range, within_bounds};
pub use resolver::{
    OverrideValue, ParameterAdjustment, ParameterOverrides, ParameterRequest, ParameterResolver,
    ResolvedParameters,
};
pub use sensitivity::{
    CusumConfig, DEFAULT_PRESET, EwmaConfig, FarringtonConfig, Preset, SensitivityConfig,
};
