//! Data model for the surveillance engine
//!
//! Observations come in from ingestion; everything else is derived per
//! request and never persisted.

pub mod bucket;
pub mod decision;
pub mod method;
pub mod observation;
pub mod week;

pub use bucket::{SeriesKey, WeeklyBucket, WeeklySeries};
pub use decision::{
    AlertLevel, ConfidenceLevel, ConsensusCounts, ConsensusDecision, DataQuality, Decision,
    Interpretation, MethodVerdict, RiskBand,
};
pub use method::{Method, MethodPoint, MethodResult, MethodSelection, MethodStatus};
pub use observation::{AgeBand, Observation, Sex};
pub use week::WeekKey;
