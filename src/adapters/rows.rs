//! Raw row adapter
//!
//! Lab extracts disagree on field names and on whether numbers arrive as
//! numbers or strings. This adapter maps every accepted spelling onto
//! [`Observation`]; nothing downstream sees the raw shapes.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::error::{Result, SurveillanceError};
use crate::models::{Observation, Sex};
use crate::utils::logging::log_warning;

const SCOPE_FIELDS: &[&str] = &["scopeId", "scope_id", "facility"];
const TEST_FIELDS: &[&str] = &["testCode", "test_code", "test"];
const VALUE_FIELDS: &[&str] = &["value", "result", "resultValue"];
const UNIT_FIELDS: &[&str] = &["unit", "units"];
const DATE_FIELDS: &[&str] = &["collectedAt", "collected_at", "date"];
const SEX_FIELDS: &[&str] = &["sex", "gender"];
const AGE_FIELDS: &[&str] = &["ageYears", "age", "age_years"];
const NATIONALITY_FIELDS: &[&str] = &["nationality"];

/// Observations adapted from a batch of raw rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdaptedRows {
    /// Rows that became observations, in input order
    pub observations: Vec<Observation>,
    /// Rows rejected as malformed
    pub rejected: usize,
}

/// First non-null value among the accepted spellings of a field
fn field<'a>(row: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .find_map(|name| row.get(*name).filter(|v| !v.is_null()))
}

fn text(row: &Map<String, Value>, names: &[&str]) -> Option<String> {
    match field(row, names)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Parse a collection date from a date, a naive timestamp or an RFC 3339 timestamp
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|dt| dt.date())
        })
}

/// Adapt one raw row.
///
/// Rows without a finite value or a parseable collection date are rejected;
/// every other field is optional.
pub fn adapt_row(index: usize, row: &Value) -> Result<Observation> {
    let Value::Object(row) = row else {
        return Err(SurveillanceError::malformed_row(index, "row is not an object"));
    };

    let value = field(row, VALUE_FIELDS)
        .and_then(number)
        .ok_or_else(|| SurveillanceError::malformed_row(index, "missing or non-numeric value"))?;

    let collected_at = text(row, DATE_FIELDS)
        .as_deref()
        .and_then(parse_date)
        .ok_or_else(|| SurveillanceError::malformed_row(index, "missing or invalid collection date"))?;

    Ok(Observation {
        scope_id: text(row, SCOPE_FIELDS).unwrap_or_default(),
        test_code: text(row, TEST_FIELDS)
            .map(|code| code.to_ascii_uppercase())
            .unwrap_or_default(),
        value,
        unit: text(row, UNIT_FIELDS).unwrap_or_default(),
        collected_at,
        sex: text(row, SEX_FIELDS).map_or(Sex::Unknown, |s| Sex::parse(&s)),
        age_years: field(row, AGE_FIELDS).and_then(number).filter(|age| *age >= 0.0),
        nationality: text(row, NATIONALITY_FIELDS).filter(|n| !n.is_empty()),
    })
}

/// Adapt a batch of rows, dropping malformed ones with a warning
pub fn adapt_rows(rows: &[Value]) -> AdaptedRows {
    let mut adapted = AdaptedRows {
        observations: Vec::with_capacity(rows.len()),
        rejected: 0,
    };
    for (index, row) in rows.iter().enumerate() {
        match adapt_row(index, row) {
            Ok(observation) => adapted.observations.push(observation),
            Err(err) => {
                log_warning("Skipping row", Some(&err.to_string()));
                adapted.rejected += 1;
            }
        }
    }
    adapted
}
