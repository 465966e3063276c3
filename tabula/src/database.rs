use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tabula_config::shared::CacheTtl;
use tracing::{debug, info};

use crate::bail;
use crate::cache::QueryCache;
use crate::connection::{Connection, QueryResult};
use crate::error::{ErrorKind, TabulaResult};
use crate::schema::{DatabaseSchema, TableSchema};
use crate::statement::is_read_only;
use crate::table::Table;
use crate::types::BackendValue;

/// A set of typed tables over one [`Connection`], sharing one [`QueryCache`].
pub struct Database<C> {
    connection: Arc<C>,
    cache: QueryCache,
    tables: Vec<Table<C>>,
    closed: Arc<AtomicBool>,
}

impl<C> Database<C>
where
    C: Connection,
{
    /// Builds a database from its declared schema and creates the tables that do not exist.
    ///
    /// Every table schema is validated before any statement is issued, so an invalid
    /// declaration fails with [`ErrorKind::SchemaError`] without touching the backend.
    pub async fn new(connection: C, ttl: CacheTtl, schema: DatabaseSchema) -> TabulaResult<Self> {
        let mut names = HashSet::new();
        let mut table_schemas = Vec::with_capacity(schema.tables().len());
        for (name, raw) in schema.tables() {
            if !names.insert(name.as_str()) {
                bail!(
                    ErrorKind::SchemaError,
                    "Duplicate table",
                    format!("table `{name}` is declared twice")
                );
            }

            table_schemas.push(TableSchema::parse(name, raw)?);
        }

        let connection = Arc::new(connection);
        let cache = QueryCache::new(ttl);
        let closed = Arc::new(AtomicBool::new(false));

        let tables = table_schemas
            .into_iter()
            .map(|schema| Table::new(schema, cache.clone(), connection.clone(), closed.clone()))
            .collect::<Vec<_>>();

        for table in &tables {
            table.create().await?;
        }

        info!(
            tables = tables.len(),
            cache_enabled = cache.is_enabled(),
            "database is ready"
        );

        Ok(Self {
            connection,
            cache,
            tables,
            closed,
        })
    }

    /// Returns the table named `name`.
    pub fn table(&self, name: &str) -> TabulaResult<&Table<C>> {
        match self.tables.iter().find(|table| table.name() == name) {
            Some(table) => Ok(table),
            None => bail!(
                ErrorKind::QueryError,
                "Unknown table",
                format!("table `{name}` is not declared")
            ),
        }
    }

    /// Returns the tables in declaration order.
    pub fn tables(&self) -> impl Iterator<Item = &Table<C>> {
        self.tables.iter()
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Executes an arbitrary statement, bypassing the cache.
    ///
    /// Any statement that is not read-only clears the whole cache once it succeeded, since
    /// it may have changed any table.
    pub async fn execute(&self, sql: &str, params: &[BackendValue]) -> TabulaResult<QueryResult> {
        if self.is_closed() {
            bail!(ErrorKind::ClosedError, "Database is closed");
        }

        debug!(sql, params = params.len(), "executing pass-through statement");
        let result = self.connection.execute(sql, params).await?;

        if !is_read_only(sql) {
            self.cache.clear().await;
        }

        Ok(result)
    }

    /// Closes the database and its connection.
    ///
    /// Cached reads are dropped and every later operation, including another call to
    /// [`Database::close`], fails with [`ErrorKind::ClosedError`].
    pub async fn close(&self) -> TabulaResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            bail!(ErrorKind::ClosedError, "Database is already closed");
        }

        self.cache.clear().await;
        self.connection.close().await?;

        info!("database closed");

        Ok(())
    }
}

impl<C> fmt::Debug for Database<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("tables", &self.tables)
            .field("cache", &self.cache)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
