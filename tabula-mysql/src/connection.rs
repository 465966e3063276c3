use sqlx::Connection as _;
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions};
use sqlx::query::Query;
use tabula::bail;
use tabula::connection::{Connection, QueryResult};
use tabula::error::{ErrorKind, TabulaError, TabulaResult};
use tabula::statement::is_read_only;
use tabula::tabula_error;
use tabula::types::BackendValue;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::decode::decode_row;

/// A [`Connection`] over one MySQL session.
///
/// Statements from concurrent callers are serialized on the session. Once closed, every
/// statement fails with [`ErrorKind::QueryError`].
#[derive(Debug)]
pub struct MySqlConnection {
    connection: Mutex<Option<sqlx::MySqlConnection>>,
}

impl MySqlConnection {
    /// Opens a session with the given options.
    pub async fn connect(options: &MySqlConnectOptions) -> TabulaResult<Self> {
        let connection = sqlx::MySqlConnection::connect_with(options)
            .await
            .map_err(|err| {
                tabula_error!(
                    ErrorKind::QueryError,
                    "Failed to connect to MySQL",
                    err,
                    source: err
                )
            })?;

        Ok(Self {
            connection: Mutex::new(Some(connection)),
        })
    }
}

impl Connection for MySqlConnection {
    async fn execute(&self, sql: &str, params: &[BackendValue]) -> TabulaResult<QueryResult> {
        let mut guard = self.connection.lock().await;
        let Some(connection) = guard.as_mut() else {
            bail!(ErrorKind::QueryError, "MySQL connection is closed");
        };

        let mut query = sqlx::query(sql);
        for param in params {
            query = bind(query, param);
        }

        if is_read_only(sql) {
            let rows = query
                .fetch_all(&mut *connection)
                .await
                .map_err(statement_error)?;
            debug!(rows = rows.len(), "fetched rows");

            let rows = rows
                .iter()
                .map(decode_row)
                .collect::<TabulaResult<Vec<_>>>()?;

            Ok(QueryResult::with_rows(rows))
        } else {
            let result = query
                .execute(&mut *connection)
                .await
                .map_err(statement_error)?;
            debug!(rows_affected = result.rows_affected(), "executed statement");

            Ok(QueryResult::with_rows_affected(result.rows_affected()))
        }
    }

    async fn close(&self) -> TabulaResult<()> {
        let connection = self.connection.lock().await.take();

        if let Some(connection) = connection {
            connection.close().await.map_err(statement_error)?;
            info!("closed MySQL connection");
        }

        Ok(())
    }
}

fn bind<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    param: &BackendValue,
) -> Query<'q, MySql, MySqlArguments> {
    match param {
        BackendValue::Null => query.bind(None::<String>),
        BackendValue::Int(value) => query.bind(*value),
        BackendValue::Double(value) => query.bind(*value),
        BackendValue::Text(value) => query.bind(value.clone()),
    }
}

/// Returns whether `sql` produces a result set to fetch.
fn statement_error(err: sqlx::Error) -> TabulaError {
    tabula_error!(
        ErrorKind::QueryError,
        "MySQL statement failed",
        err,
        source: err
    )
}
