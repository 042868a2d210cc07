//! Boundary adapters
//!
//! Normalize heterogeneous external shapes into the canonical model before
//! anything reaches aggregation, detection or consensus.

pub mod method_results;
pub mod rows;

pub use method_results::{adapt_method_result, adapt_point, adapt_points};
pub use rows::{AdaptedRows, adapt_row, adapt_rows, parse_date};
