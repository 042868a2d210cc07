//! Surveillance algorithms
//!
//! Aggregation into weekly series, the three detectors, per-method
//! interpretation, data-quality evaluation and ensemble consensus, plus the
//! pipeline that runs them in order.

pub mod aggregation;
pub mod consensus;
pub mod detection;
pub mod interpretation;
pub mod pipeline;
pub mod quality;

pub use aggregation::WeeklyAggregator;
pub use consensus::reach_consensus;
pub use detection::{CusumDetector, Detector, EwmaDetector, FarringtonDetector, run_methods};
pub use interpretation::interpret;
pub use pipeline::{SurveillancePipeline, SurveillanceReport};
