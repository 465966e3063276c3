use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::MySqlRow;
use sqlx::types::JsonValue;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tabula::error::{ErrorKind, TabulaError, TabulaResult};
use tabula::tabula_error;
use tabula::types::{BackendValue, RawRow};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIME_FORMAT: &str = "%H:%M:%S";

/// How a MySQL column is read into a [`BackendValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    Bool,
    Int,
    UnsignedInt,
    Float,
    Double,
    Date,
    DateTime,
    Time,
    Json,
    Text,
}

impl ColumnKind {
    /// Classifies a column from the type name reported by the server, e.g. `INT UNSIGNED`.
    pub(crate) fn from_type_name(name: &str) -> ColumnKind {
        let name = name.to_ascii_uppercase();
        let (base, unsigned) = match name.strip_suffix(" UNSIGNED") {
            Some(base) => (base, true),
            None => (name.as_str(), false),
        };

        match base {
            "BOOLEAN" => ColumnKind::Bool,
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" if unsigned => {
                ColumnKind::UnsignedInt
            }
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => ColumnKind::Int,
            "FLOAT" => ColumnKind::Float,
            "DOUBLE" => ColumnKind::Double,
            "DATE" => ColumnKind::Date,
            "DATETIME" | "TIMESTAMP" => ColumnKind::DateTime,
            "TIME" => ColumnKind::Time,
            "JSON" => ColumnKind::Json,
            _ => ColumnKind::Text,
        }
    }
}

/// Reads every column of a MySQL row into a [`RawRow`].
pub(crate) fn decode_row(row: &MySqlRow) -> TabulaResult<RawRow> {
    let mut raw = RawRow::new();
    for (index, column) in row.columns().iter().enumerate() {
        let kind = ColumnKind::from_type_name(column.type_info().name());
        let value =
            decode_cell(row, index, kind).map_err(|err| decode_error(column.name(), err))?;
        raw.insert(column.name(), value);
    }

    Ok(raw)
}

fn decode_cell(
    row: &MySqlRow,
    index: usize,
    kind: ColumnKind,
) -> Result<BackendValue, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(BackendValue::Null);
    }

    let value = match kind {
        ColumnKind::Bool => BackendValue::Int(i64::from(row.try_get::<bool, _>(index)?)),
        ColumnKind::Int => BackendValue::Int(row.try_get::<i64, _>(index)?),
        ColumnKind::UnsignedInt => {
            let value = row.try_get::<u64, _>(index)?;
            match i64::try_from(value) {
                Ok(value) => BackendValue::Int(value),
                Err(_) => BackendValue::Text(value.to_string()),
            }
        }
        ColumnKind::Float => BackendValue::Double(f64::from(row.try_get::<f32, _>(index)?)),
        ColumnKind::Double => BackendValue::Double(row.try_get::<f64, _>(index)?),
        ColumnKind::Date => BackendValue::Text(
            row.try_get::<NaiveDate, _>(index)?
                .format(DATE_FORMAT)
                .to_string(),
        ),
        ColumnKind::DateTime => BackendValue::Text(
            row.try_get::<NaiveDateTime, _>(index)?
                .format(DATETIME_FORMAT)
                .to_string(),
        ),
        ColumnKind::Time => BackendValue::Text(
            row.try_get::<NaiveTime, _>(index)?
                .format(TIME_FORMAT)
                .to_string(),
        ),
        ColumnKind::Json => BackendValue::Text(row.try_get::<JsonValue, _>(index)?.to_string()),
        ColumnKind::Text => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
            BackendValue::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
    };

    Ok(value)
}

fn decode_error(column: &str, err: sqlx::Error) -> TabulaError {
    tabula_error!(
        ErrorKind::CodecError,
        "Failed to read MySQL column",
        format!("column `{column}`: {err}"),
        source: err
    )
}
