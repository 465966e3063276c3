//! Conversion of column values between the application and backend domains.
//!
//! Every [`TypeTag`] has one encoder and one decoder, selected through exhaustive matches.
//! [`Value::Null`] and [`BackendValue::Null`] pass through unchanged for every tag.

use crate::conversions::bool::{bool_to_int, int_to_bool, parse_bool};
use crate::conversions::numeric::{parse_double, parse_int};
use crate::conversions::time::{
    format_date, format_date_time, format_time, parse_date, parse_date_time, parse_time,
};
use crate::error::{ErrorKind, TabulaError, TabulaResult};
use crate::schema::{TableSchema, TypeTag};
use crate::tabula_error;
use crate::types::{BackendValue, RawRow, Row, Value};

/// Converts an application value into its backend representation for `tag`.
pub fn encode_value(tag: TypeTag, value: &Value) -> TabulaResult<BackendValue> {
    if value.is_null() {
        return Ok(BackendValue::Null);
    }

    let encoded = match (tag, value) {
        (TypeTag::Int, Value::Int(value)) => BackendValue::Int(*value),
        (TypeTag::Double, Value::Double(value)) => BackendValue::Double(*value),
        (TypeTag::Double, Value::Int(value)) => BackendValue::Double(*value as f64),
        (TypeTag::Boolean, Value::Bool(value)) => BackendValue::Int(bool_to_int(*value)),
        (TypeTag::Date, Value::Date(date)) => BackendValue::Text(format_date(date)),
        (TypeTag::Date, Value::DateTime(date_time)) => {
            BackendValue::Text(format_date(&date_time.date()))
        }
        (TypeTag::DateTime, Value::DateTime(date_time)) => {
            BackendValue::Text(format_date_time(date_time))
        }
        (TypeTag::DateTime, Value::Date(date)) => {
            BackendValue::Text(format_date_time(&date.and_time(chrono::NaiveTime::MIN)))
        }
        (TypeTag::TimeStamp, Value::Int(value)) => BackendValue::Int(*value),
        (TypeTag::TimeStamp, Value::String(value)) => BackendValue::Text(value.clone()),
        (TypeTag::TimeStamp, Value::DateTime(date_time)) => {
            BackendValue::Text(format_date_time(date_time))
        }
        (TypeTag::Time, Value::DateTime(date_time)) => {
            BackendValue::Text(format_time(&date_time.time()))
        }
        (
            TypeTag::Text
            | TypeTag::MediumText
            | TypeTag::LongText
            | TypeTag::VarChar(_)
            | TypeTag::Char(_),
            Value::String(value),
        ) => BackendValue::Text(value.clone()),
        (TypeTag::Json, value) => match json_document(value) {
            Some(document) => BackendValue::Text(serde_json::to_string(&document)?),
            None => return Err(encode_mismatch(TypeTag::Json, value)),
        },
        (tag, value) => return Err(encode_mismatch(tag, value)),
    };

    Ok(encoded)
}

/// Converts a backend value into its application representation for `tag`.
pub fn decode_value(tag: TypeTag, value: BackendValue) -> TabulaResult<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    let decoded = match (tag, value) {
        (TypeTag::Int, BackendValue::Int(value)) => Value::Int(value),
        (TypeTag::Int, BackendValue::Text(value)) => Value::Int(parse_int(&value)?),
        (TypeTag::Double, BackendValue::Double(value)) => Value::Double(value),
        (TypeTag::Double, BackendValue::Int(value)) => Value::Double(value as f64),
        (TypeTag::Double, BackendValue::Text(value)) => Value::Double(parse_double(&value)?),
        (TypeTag::Boolean, BackendValue::Int(value)) => Value::Bool(int_to_bool(value)),
        (TypeTag::Boolean, BackendValue::Text(value)) => Value::Bool(parse_bool(&value)?),
        (TypeTag::Date, BackendValue::Text(value)) => Value::Date(parse_date(&value)?),
        (TypeTag::DateTime, BackendValue::Text(value)) => {
            Value::DateTime(parse_date_time(&value)?)
        }
        (TypeTag::TimeStamp, BackendValue::Int(value)) => Value::Int(value),
        (TypeTag::TimeStamp, BackendValue::Text(value)) => Value::String(value),
        (TypeTag::Time, BackendValue::Text(value)) => Value::DateTime(parse_time(&value)?),
        (
            TypeTag::Text
            | TypeTag::MediumText
            | TypeTag::LongText
            | TypeTag::VarChar(_)
            | TypeTag::Char(_),
            BackendValue::Text(value),
        ) => Value::String(value),
        (TypeTag::Json, BackendValue::Text(value)) => Value::Json(serde_json::from_str(&value)?),
        (TypeTag::Json, BackendValue::Int(value)) => Value::Json(value.into()),
        (TypeTag::Json, BackendValue::Double(value)) => match serde_json::Number::from_f64(value) {
            Some(number) => Value::Json(serde_json::Value::Number(number)),
            None => return Err(decode_mismatch(TypeTag::Json, &BackendValue::Double(value))),
        },
        (tag, value) => return Err(decode_mismatch(tag, &value)),
    };

    Ok(decoded)
}

/// Encodes exactly the columns present in `row`, in declaration order.
///
/// Fails with [`ErrorKind::QueryError`] when `row` names a column the schema does not
/// declare.
pub fn encode_row(schema: &TableSchema, row: &Row) -> TabulaResult<Vec<(String, BackendValue)>> {
    if let Some(unknown) = row.columns().find(|name| schema.column(name).is_none()) {
        return Err(tabula_error!(
            ErrorKind::QueryError,
            "Unknown column",
            format!("column `{unknown}` is not declared in table `{schema}`")
        ));
    }

    let mut encoded = Vec::with_capacity(row.len());
    for column in schema.columns() {
        if let Some(value) = row.get(&column.name) {
            let value = encode_value(column.type_tag, value)
                .map_err(|err| with_column(err, schema, &column.name))?;
            encoded.push((column.name.clone(), value));
        }
    }

    Ok(encoded)
}

/// Decodes a backend row using the tags of the schema's columns.
///
/// Columns the backend did not return are left out; columns the schema does not declare
/// are ignored.
pub fn decode_row(schema: &TableSchema, mut row: RawRow) -> TabulaResult<Row> {
    let mut decoded = Row::new();
    for column in schema.columns() {
        if let Some(value) = row.take(&column.name) {
            let value = decode_value(column.type_tag, value)
                .map_err(|err| with_column(err, schema, &column.name))?;
            decoded.insert(column.name.clone(), value);
        }
    }

    Ok(decoded)
}

/// Returns the JSON document stored for `value` in a json column.
///
/// Dates and datetimes are stored as their formatted strings. Non-finite doubles have no
/// JSON representation.
fn json_document(value: &Value) -> Option<serde_json::Value> {
    let document = match value {
        Value::Null => serde_json::Value::Null,
        Value::Int(value) => serde_json::Value::from(*value),
        Value::Double(value) => serde_json::Value::Number(serde_json::Number::from_f64(*value)?),
        Value::Bool(value) => serde_json::Value::Bool(*value),
        Value::Date(date) => serde_json::Value::String(format_date(date)),
        Value::DateTime(date_time) => serde_json::Value::String(format_date_time(date_time)),
        Value::String(value) => serde_json::Value::String(value.clone()),
        Value::Json(value) => value.clone(),
    };

    Some(document)
}

fn encode_mismatch(tag: TypeTag, value: &Value) -> TabulaError {
    tabula_error!(
        ErrorKind::CodecError,
        "Value does not match column type",
        format!(
            "cannot encode a {} value as `{tag}`",
            value.variant_name()
        )
    )
}

fn decode_mismatch(tag: TypeTag, value: &BackendValue) -> TabulaError {
    tabula_error!(
        ErrorKind::CodecError,
        "Backend value does not match column type",
        format!("cannot decode {value} as `{tag}`")
    )
}

/// Adds the failing column to the detail of a codec error.
fn with_column(err: TabulaError, schema: &TableSchema, column: &str) -> TabulaError {
    let detail = match err.detail() {
        Some(detail) => format!("column `{schema}.{column}`: {detail}"),
        None => format!("column `{schema}.{column}`"),
    };

    TabulaError::from((err.kind(), "Column conversion failed", detail)).with_source(err)
}
