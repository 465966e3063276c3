use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::bail;
use crate::connection::{Connection, QueryResult};
use crate::error::{ErrorKind, TabulaError, TabulaResult};
use crate::statement::Statement;
use crate::types::{BackendValue, RawRow};

#[derive(Debug)]
struct MemoryTable {
    primary_key: String,
    rows: Vec<RawRow>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<String, MemoryTable>,
    statements: Vec<Statement>,
    failure: Option<TabulaError>,
    closed: bool,
}

/// In-memory [`Connection`] for tests.
///
/// [`MemoryConnection`] records every statement it receives and evaluates the statements
/// generated by [`crate::statement::StatementBuilder`] against in-memory tables, so tests can
/// observe both what was sent to the backend and its effect. Clones share the same state,
/// which lets a test keep a handle after moving the connection into a
/// [`crate::database::Database`].
#[derive(Debug, Clone, Default)]
pub struct MemoryConnection {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every statement received so far, including failed ones.
    pub async fn statements(&self) -> Vec<Statement> {
        let inner = self.inner.lock().await;
        inner.statements.clone()
    }

    /// Returns how many received statements start with `prefix`, e.g. `"SELECT"`.
    pub async fn executed(&self, prefix: &str) -> usize {
        let inner = self.inner.lock().await;
        inner
            .statements
            .iter()
            .filter(|statement| statement.sql.starts_with(prefix))
            .count()
    }

    /// Returns the rows currently stored in `table`.
    pub async fn rows(&self, table: &str) -> Vec<RawRow> {
        let inner = self.inner.lock().await;
        inner
            .tables
            .get(table)
            .map(|table| table.rows.clone())
            .unwrap_or_default()
    }

    /// Makes the next statement fail with `error` without being evaluated.
    pub async fn fail_next(&self, error: TabulaError) {
        let mut inner = self.inner.lock().await;
        inner.failure = Some(error);
    }

    pub async fn is_closed(&self) -> bool {
        let inner = self.inner.lock().await;
        inner.closed
    }

    /// Forgets the recorded statements, keeping the stored rows.
    pub async fn clear_statements(&self) {
        let mut inner = self.inner.lock().await;
        inner.statements.clear();
    }
}

impl Connection for MemoryConnection {
    async fn execute(&self, sql: &str, params: &[BackendValue]) -> TabulaResult<QueryResult> {
        let mut inner = self.inner.lock().await;
        inner
            .statements
            .push(Statement::new(sql, params.to_vec()));

        if inner.closed {
            bail!(ErrorKind::QueryError, "Connection is closed");
        }

        if let Some(error) = inner.failure.take() {
            debug!(sql, "failing statement on request");
            return Err(error);
        }

        evaluate(&mut inner.tables, sql, params)
    }

    async fn close(&self) -> TabulaResult<()> {
        let mut inner = self.inner.lock().await;
        inner.closed = true;

        info!("closing memory connection");

        Ok(())
    }
}

fn evaluate(
    tables: &mut HashMap<String, MemoryTable>,
    sql: &str,
    params: &[BackendValue],
) -> TabulaResult<QueryResult> {
    if let Some(rest) = sql.strip_prefix("CREATE TABLE IF NOT EXISTS ") {
        let name = rest.split_whitespace().next().unwrap_or_default();
        let Some(primary_key) = rest
            .split_once("PRIMARY KEY (")
            .and_then(|(_, tail)| tail.split_once(')'))
            .map(|(primary_key, _)| primary_key)
        else {
            bail!(ErrorKind::QueryError, "Missing primary key", sql.to_string());
        };

        tables
            .entry(name.to_string())
            .or_insert_with(|| MemoryTable {
                primary_key: primary_key.to_string(),
                rows: Vec::new(),
            });

        return Ok(QueryResult::default());
    }

    if let Some(rest) = sql.strip_prefix("SELECT ") {
        let Some((columns, rest)) = rest.split_once(" FROM ") else {
            bail!(ErrorKind::QueryError, "Malformed select", sql.to_string());
        };
        let (name, filter) = split_where(rest)?;
        let table = table(tables, name)?;

        let rows = table
            .rows
            .iter()
            .filter(|row| matches(row, filter, params.first()))
            .map(|row| {
                columns
                    .split(", ")
                    .map(|column| {
                        let value = row.get(column).cloned().unwrap_or(BackendValue::Null);
                        (column, value)
                    })
                    .collect::<RawRow>()
            })
            .collect();

        return Ok(QueryResult::with_rows(rows));
    }

    if let Some(rest) = sql.strip_prefix("INSERT INTO ") {
        let Some((name, rest)) = rest.split_once(" (") else {
            bail!(ErrorKind::QueryError, "Malformed insert", sql.to_string());
        };
        let columns = rest.split_once(')').map(|(columns, _)| columns).unwrap_or_default();
        let table = table(tables, name)?;

        let row = columns
            .split(", ")
            .zip(params.iter().cloned())
            .collect::<RawRow>();

        let key = row.get(&table.primary_key).cloned();
        if table
            .rows
            .iter()
            .any(|existing| existing.get(&table.primary_key).cloned() == key)
        {
            bail!(
                ErrorKind::QueryError,
                "Duplicate entry for primary key",
                format!("table `{name}` already holds key {key:?}")
            );
        }

        table.rows.push(row);

        return Ok(QueryResult::with_rows_affected(1));
    }

    if let Some(rest) = sql.strip_prefix("UPDATE ") {
        let Some((name, rest)) = rest.split_once(" SET ") else {
            bail!(ErrorKind::QueryError, "Malformed update", sql.to_string());
        };
        let Some((assignments, filter)) = rest.split_once(" WHERE ") else {
            bail!(ErrorKind::QueryError, "Malformed update", sql.to_string());
        };
        let filter = placeholder_column(filter)?;
        let table = table(tables, name)?;

        let columns = assignments
            .split(", ")
            .map(placeholder_column)
            .collect::<TabulaResult<Vec<_>>>()?;
        let key = params.last();

        let mut affected = 0;
        for row in table.rows.iter_mut() {
            if !matches(row, Some(filter), key) {
                continue;
            }

            for (column, value) in columns.iter().zip(params.iter()) {
                row.insert(*column, value.clone());
            }
            affected += 1;
        }

        return Ok(QueryResult::with_rows_affected(affected));
    }

    if let Some(rest) = sql.strip_prefix("DELETE FROM ") {
        let (name, filter) = split_where(rest)?;
        let table = table(tables, name)?;

        let before = table.rows.len();
        table
            .rows
            .retain(|row| !matches(row, filter, params.first()));

        return Ok(QueryResult::with_rows_affected(
            (before - table.rows.len()) as u64,
        ));
    }

    bail!(
        ErrorKind::QueryError,
        "Unsupported statement",
        sql.to_string()
    );
}

fn table<'a>(
    tables: &'a mut HashMap<String, MemoryTable>,
    name: &str,
) -> TabulaResult<&'a mut MemoryTable> {
    match tables.get_mut(name) {
        Some(table) => Ok(table),
        None => bail!(
            ErrorKind::QueryError,
            "Table doesn't exist",
            format!("table `{name}` was never created")
        ),
    }
}

/// Splits `table WHERE column = ?` into the table name and the filtered column.
fn split_where(rest: &str) -> TabulaResult<(&str, Option<&str>)> {
    match rest.split_once(" WHERE ") {
        Some((name, filter)) => Ok((name, Some(placeholder_column(filter)?))),
        None => Ok((rest.trim(), None)),
    }
}

fn placeholder_column(assignment: &str) -> TabulaResult<&str> {
    match assignment.trim().strip_suffix(" = ?") {
        Some(column) => Ok(column),
        None => bail!(
            ErrorKind::QueryError,
            "Unsupported condition",
            assignment.to_string()
        ),
    }
}

fn matches(row: &RawRow, filter: Option<&str>, value: Option<&BackendValue>) -> bool {
    match (filter, value) {
        (None, _) => true,
        (Some(column), Some(value)) => row.get(column) == Some(value),
        (Some(_), None) => false,
    }
}
