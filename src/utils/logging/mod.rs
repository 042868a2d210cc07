//! Logging utilities
//!
//! Consistent start/complete/warning messages for pipeline operations.

pub mod log;

pub use self::log::{log_operation_complete, log_operation_start, log_warning};
