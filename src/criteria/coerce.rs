//! Fail-closed coercions used by the ordering operators.

use crate::model::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

pub(crate) fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) if n.is_finite() => Some(*n),
        Value::Text(s) => parse_number(s),
        _ => None,
    }
}

pub(crate) fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

pub(crate) fn to_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Text(s) => parse_datetime(s),
        _ => None,
    }
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DD[ HH:MM:SS]`, `MM/DD/YYYY` and `YYYY/MM/DD`.
pub(crate) fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Orders a record value against a literal numerically. `None` if either side is not a number.
pub(crate) fn compare_numbers(actual: &Value, literal: &str) -> Option<Ordering> {
    let left = to_number(actual)?;
    let right = parse_number(literal)?;
    left.partial_cmp(&right)
}

/// Orders a record value against a literal chronologically. `None` if either side is not a date.
pub(crate) fn compare_dates(actual: &Value, literal: &str) -> Option<Ordering> {
    let left = to_datetime(actual)?;
    let right = parse_datetime(literal)?;
    Some(left.cmp(&right))
}
