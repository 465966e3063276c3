use std::future::Future;

use crate::error::TabulaResult;
use crate::types::{BackendValue, RawRow};

/// Outcome of a statement executed by a [`Connection`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Rows returned by the statement, empty for statements that return none.
    pub rows: Vec<RawRow>,
    /// Number of rows changed by the statement, zero for reads.
    pub rows_affected: u64,
}

impl QueryResult {
    pub fn with_rows(rows: Vec<RawRow>) -> Self {
        Self {
            rows,
            rows_affected: 0,
        }
    }

    pub fn with_rows_affected(rows_affected: u64) -> Self {
        Self {
            rows: Vec::new(),
            rows_affected,
        }
    }
}

/// Executes parameterized statements against a relational backend.
///
/// A [`Connection`] owns the transport and its lifecycle. Implementations must accept calls
/// from concurrent tasks and serialize the statements themselves if the underlying transport
/// requires it. Every `?` placeholder in `sql` is bound to the parameter at the same
/// position in `params`.
///
/// Errors reported by the backend should be surfaced as
/// [`crate::error::ErrorKind::QueryError`] with the backend error attached as source.
pub trait Connection {
    /// Executes `sql` with `params` bound to its placeholders.
    fn execute(
        &self,
        sql: &str,
        params: &[BackendValue],
    ) -> impl Future<Output = TabulaResult<QueryResult>> + Send;

    /// Terminates the connection. No statement is issued afterwards.
    ///
    /// The default implementation is a no-op.
    fn close(&self) -> impl Future<Output = TabulaResult<()>> + Send {
        async { Ok(()) }
    }
}
