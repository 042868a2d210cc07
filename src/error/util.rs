//! Utility functions for error handling
//!
//! Helpers that turn low-level I/O failures into errors that name the file
//! and what it was needed for.

use std::io;
use std::path::Path;

use crate::error::{Result, SurveillanceError};

/// Check that an input file exists and is a regular file
///
/// # Arguments
/// * `path` - The path to check
/// * `purpose` - Why the file is needed (for error context)
pub fn validate_input_file(path: &Path, purpose: &str) -> Result<()> {
    if !path.exists() {
        return Err(SurveillanceError::file(
            path,
            format!("File not found, needed for: {purpose}"),
        ));
    }

    if !path.is_file() {
        return Err(SurveillanceError::file(
            path,
            format!("Path is not a file, expected a file for: {purpose}"),
        ));
    }

    Ok(())
}

/// Attach the file path and purpose to an I/O error
pub fn describe_io_error(path: &Path, purpose: &str, error: &io::Error) -> SurveillanceError {
    let context = match error.kind() {
        io::ErrorKind::PermissionDenied => "Permission denied - check file permissions".to_string(),
        io::ErrorKind::NotFound => {
            "File not found - it may have been deleted during operation".to_string()
        }
        io::ErrorKind::InvalidData => {
            "File contains invalid UTF-8 data - cannot read as text".to_string()
        }
        _ => format!("Failed to read file for: {purpose}: {error}"),
    };

    SurveillanceError::file(path, context)
}
