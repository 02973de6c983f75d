use std::collections::HashMap;

use chrono::{self, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::warn;
use serde_json::Value;

use crate::util::f64_to_i64_safe;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// An attribute value is a runtime comparison value pulled out of an evaluation context by a
/// [crate::ConditionSet].
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    /// Stores a string value.
    String(String),
    /// Stores a number.
    Number(f64),
    /// Stores a boolean.
    Bool(bool),
    /// Stores a wall-clock timestamp in whatever reference frame the extractor chose.
    DateTime(NaiveDateTime),
    /// Stores a null value.
    Null,
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> AttributeValue {
        AttributeValue::String(s.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> AttributeValue {
        AttributeValue::String(s)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> AttributeValue {
        AttributeValue::Bool(b)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Number(i as f64)
    }
}

impl From<f64> for AttributeValue {
    fn from(f: f64) -> Self {
        AttributeValue::Number(f)
    }
}

impl From<NaiveDateTime> for AttributeValue {
    fn from(dt: NaiveDateTime) -> Self {
        AttributeValue::DateTime(dt)
    }
}

impl From<&Value> for AttributeValue {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => AttributeValue::Null,
            Value::Bool(b) => AttributeValue::Bool(*b),
            Value::Number(n) => match n.as_f64() {
                Some(float) => AttributeValue::Number(float),
                None => {
                    warn!("could not interpret '{:?}' as f64", n);
                    AttributeValue::String(n.to_string())
                }
            },
            Value::String(s) => AttributeValue::String(s.clone()),
            // Nested values have no comparator; keep their JSON text so equality still works.
            Value::Array(_) | Value::Object(_) => AttributeValue::String(v.to_string()),
        }
    }
}

impl AttributeValue {
    /// Builds an attribute map from a JSON object. Non-object values yield an empty map.
    pub fn map_from_json(v: &Value) -> HashMap<String, AttributeValue> {
        match v {
            Value::Object(obj) => obj.iter().map(|(k, v)| (k.clone(), v.into())).collect(),
            _ => HashMap::new(),
        }
    }

    /// Returns None unless self is a String. It will not convert.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a float for numbers and numeric strings, and None otherwise.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(f) => Some(*f),
            AttributeValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Truthiness used by boolean fields: false, zero, the empty string and null are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            AttributeValue::Bool(b) => *b,
            AttributeValue::Number(f) => *f != 0.0,
            AttributeValue::String(s) => !s.is_empty(),
            AttributeValue::DateTime(_) => true,
            AttributeValue::Null => false,
        }
    }

    /// Attempt to convert into a naive timestamp:
    ///  * a DateTime value is returned as-is
    ///  * ISO8601 strings, with or without time part; offsets are normalised to UTC
    ///  * Unix epoch milliseconds as number, read as UTC
    pub fn to_naive_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            AttributeValue::DateTime(dt) => Some(*dt),
            AttributeValue::String(s) => parse_naive_datetime(s),
            AttributeValue::Number(millis) => {
                f64_to_i64_safe(*millis).and_then(|millis| match Utc.timestamp_millis_opt(millis) {
                    LocalResult::None | LocalResult::Ambiguous(_, _) => None,
                    LocalResult::Single(time) => Some(time.naive_utc()),
                })
            }
            AttributeValue::Bool(_) | AttributeValue::Null => None,
        }
    }

    /// The textual form used when a stored condition string is compared for equality.
    #[allow(clippy::float_cmp)]
    pub fn to_comparable_string(&self) -> Option<String> {
        match self {
            AttributeValue::String(s) => Some(s.clone()),
            AttributeValue::Bool(b) => Some(b.to_string()),
            AttributeValue::Number(f) => Some(match f64_to_i64_safe(*f) {
                Some(i) if i as f64 == *f => i.to_string(),
                _ => f.to_string(),
            }),
            AttributeValue::DateTime(dt) => Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            AttributeValue::Null => None,
        }
    }

    #[allow(clippy::float_cmp)]
    pub(crate) fn as_bucketable(&self) -> Option<String> {
        match self {
            AttributeValue::String(s) if !s.is_empty() => Some(s.clone()),
            AttributeValue::Number(f) => {
                // We only support integer values as bucketable
                f64_to_i64_safe(*f).and_then(|i| {
                    if i as f64 == *f {
                        Some(i.to_string())
                    } else {
                        None
                    }
                })
            }
            _ => None,
        }
    }
}

pub(crate) fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    parse_wall_clock(s)
}

/// Parses a date or date-time written without an offset. Strings carrying an offset are
/// rejected, since they name an instant rather than a wall-clock reading.
pub(crate) fn parse_wall_clock(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| parse_naive_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

pub(crate) fn parse_naive_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}
