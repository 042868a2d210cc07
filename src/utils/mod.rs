//! Shared helpers: logging and small statistics routines

pub mod logging;
pub mod stats;

pub use logging::{log_operation_complete, log_operation_start, log_warning};
