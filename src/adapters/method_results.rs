//! External method-result adapter
//!
//! Detector output computed elsewhere arrives with its own field names. It is
//! normalized here into [`MethodResult`] so that interpretation and consensus
//! only ever read the canonical shape.

use log::debug;
use serde_json::{Map, Value};

use crate::error::{Result, SurveillanceError};
use crate::models::{Method, MethodPoint, MethodResult, MethodStatus, WeekKey};
use crate::utils::logging::log_warning;

const STATISTIC_FIELDS: &[&str] = &["statistic", "value", "ewma", "cusum", "observed"];
const LIMIT_FIELDS: &[&str] = &["controlLimit", "ucl", "threshold", "upper"];
const ALERT_FIELDS: &[&str] = &["alert", "flag", "signal"];
const WEEK_FIELDS: &[&str] = &["week", "weekKey", "isoWeek"];
const N_FIELDS: &[&str] = &["n", "count", "total"];
const POINT_LIST_FIELDS: &[&str] = &["points", "series", "results"];

fn field<'a>(object: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .find_map(|name| object.get(*name).filter(|v| !v.is_null()))
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|v: &f64| v.is_finite())
}

fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Adapt one external point.
///
/// The alert flag is recomputed from statistic and limit; an external flag
/// that disagrees is logged and overruled.
pub fn adapt_point(method: Method, index: usize, point: &Value) -> Result<MethodPoint> {
    let Value::Object(point) = point else {
        return Err(SurveillanceError::malformed_row(index, "point is not an object"));
    };

    let week: WeekKey = field(point, WEEK_FIELDS)
        .and_then(Value::as_str)
        .ok_or_else(|| SurveillanceError::malformed_row(index, "missing week"))?
        .parse()?;
    let statistic = field(point, STATISTIC_FIELDS)
        .and_then(number)
        .ok_or_else(|| SurveillanceError::malformed_row(index, "missing or non-numeric statistic"))?;
    let n = field(point, N_FIELDS)
        .and_then(number)
        .map_or(0, |n| n.max(0.0).round() as u32);
    let limit = field(point, LIMIT_FIELDS).and_then(number);

    let adapted = match limit {
        Some(limit) => MethodPoint::evaluated(week, statistic, limit, n),
        None => MethodPoint::unevaluated(week, statistic, n),
    };

    if let Some(external) = field(point, ALERT_FIELDS).and_then(flag) {
        if external != adapted.alert {
            debug!(
                "{method} point {week}: external alert flag {external} overruled by limit comparison"
            );
        }
    }
    Ok(adapted)
}

/// Adapt a list of external points for `method`
pub fn adapt_points(method: Method, points: &[Value]) -> Result<MethodResult> {
    let points = points
        .iter()
        .enumerate()
        .map(|(index, point)| adapt_point(method, index, point))
        .collect::<Result<Vec<_>>>()?;
    Ok(MethodResult::from_points(method, points, short_status(method)))
}

/// Adapt an external result object carrying its method name and points
pub fn adapt_method_result(value: &Value) -> Result<MethodResult> {
    let Value::Object(object) = value else {
        return Err(SurveillanceError::ContractViolation(
            "method result is not an object".to_string(),
        ));
    };
    let method: Method = object
        .get("method")
        .and_then(Value::as_str)
        .ok_or_else(|| SurveillanceError::ContractViolation("method result without a method name".to_string()))?
        .parse()?;

    match field(object, POINT_LIST_FIELDS) {
        Some(Value::Array(points)) => adapt_points(method, points),
        Some(_) => Err(SurveillanceError::ContractViolation(format!(
            "{method} points are not a list"
        ))),
        None => {
            log_warning("Method result without points", Some(method.name()));
            Ok(MethodResult::from_points(method, Vec::new(), short_status(method)))
        }
    }
}

/// Status reported when the latest point has no control limit
const fn short_status(method: Method) -> MethodStatus {
    match method {
        Method::Farrington => MethodStatus::InsufficientHistory,
        Method::Ewma | Method::Cusum => MethodStatus::InsufficientData,
    }
}
