//! Lenient access to raw OpenAlex work records.
//!
//! OpenAlex does not guarantee the shape of a work field by field, so a [`RawWork`] keeps
//! the decoded JSON as-is and every accessor answers "absent" for a missing key, a
//! `null`, or a value of the wrong type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single work record exactly as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawWork(Value);

impl RawWork {
    /// Wraps a decoded JSON value. Non-object values are accepted and behave like `{}`.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Follows a path of object keys. `null` counts as absent.
    pub(crate) fn at(&self, path: &[&str]) -> Option<&Value> {
        lookup(&self.0, path)
    }

    /// String value at `path`, untrimmed.
    pub(crate) fn str_at(&self, path: &[&str]) -> Option<&str> {
        self.at(path).and_then(Value::as_str)
    }

    /// Array at `path`, or an empty slice.
    pub(crate) fn array_at(&self, path: &[&str]) -> &[Value] {
        self.at(path)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Object at `path` when it is a non-empty JSON object.
    pub(crate) fn non_empty_object_at(&self, path: &[&str]) -> Option<&Value> {
        self.at(path)
            .filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
    }
}

impl From<Value> for RawWork {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

pub(crate) fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.get(*key))
        .filter(|v| !v.is_null())
}

pub(crate) fn str_in<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(value, path).and_then(Value::as_str)
}

/// Best-effort integer coercion: integers, finite floats (truncated), and numeric strings.
pub(crate) fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Best-effort float coercion: numbers and numeric strings, finite values only.
pub(crate) fn coerce_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|f: &f64| f.is_finite())
}
