//! Weekly laboratory surveillance engine.
//!
//! Aggregates lab results into gap-free weekly series of abnormal-result
//! rates, runs EWMA, CUSUM and Farrington-style detectors over them and
//! reconciles the detectors into one data-quality-aware decision.

pub mod adapters;
pub mod algorithm;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod parameters;
pub mod registry;
pub mod utils;

// Core types
pub use config::SurveillanceConfig;
pub use error::{Result, SurveillanceError};

// Pipeline
pub use algorithm::{SurveillancePipeline, SurveillanceReport, WeeklyAggregator};

// Model types
pub use models::{
    ConsensusDecision, DataQuality, Decision, Interpretation, Method, MethodResult,
    MethodSelection, Observation, SeriesKey, WeekKey, WeeklyBucket, WeeklySeries,
};

// Parameters
pub use parameters::{ParameterOverrides, ParameterRequest, ParameterResolver, Preset};

// Signals and loading
pub use loader::{JsonRowLoader, RowLoader, Selection};
pub use registry::{SignalDefinition, signal, signal_for_test};
