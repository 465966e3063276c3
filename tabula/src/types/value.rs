use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// An application-level column value.
///
/// Values are what callers put into and get out of a [`crate::types::Row`]. The codec
/// converts them to and from [`BackendValue`] according to the column's declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Double(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    String(String),
    Json(serde_json::Value),
}

impl Value {
    /// Returns `true` if the value is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(value) => Some(*value),
            Value::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns a short name of the variant, used in error details.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Bool(_) => "bool",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::String(_) => "string",
            Value::Json(_) => "json",
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::Json(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A value in the representation exchanged with the backend.
///
/// This is both the type of bound statement parameters and of the cells returned by a
/// [`crate::connection::Connection`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendValue {
    Null,
    Int(i64),
    Double(f64),
    Text(String),
}

impl BackendValue {
    pub fn is_null(&self) -> bool {
        matches!(self, BackendValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            BackendValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for BackendValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendValue::Null => f.write_str("NULL"),
            BackendValue::Int(value) => write!(f, "{value}"),
            BackendValue::Double(value) => write!(f, "{value}"),
            BackendValue::Text(value) => write!(f, "'{value}'"),
        }
    }
}

impl From<i64> for BackendValue {
    fn from(value: i64) -> Self {
        BackendValue::Int(value)
    }
}

impl From<f64> for BackendValue {
    fn from(value: f64) -> Self {
        BackendValue::Double(value)
    }
}

impl From<&str> for BackendValue {
    fn from(value: &str) -> Self {
        BackendValue::Text(value.to_string())
    }
}

impl From<String> for BackendValue {
    fn from(value: String) -> Self {
        BackendValue::Text(value)
    }
}
