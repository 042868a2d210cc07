//! Registry of surveillance signals
//!
//! Immutable per-test metadata: which test a signal is computed from, the
//! abnormality rule, accepted units and recommended follow-up.

pub mod signals;

pub use signals::{FlagRule, SignalDefinition, UnitConversion, signal, signal_for_test, signals};
