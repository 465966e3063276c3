use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::bail;
use crate::cache::{CacheKey, CachedResult, QueryCache};
use crate::connection::{Connection, QueryResult};
use crate::conversions::codec::{decode_row, encode_row, encode_value};
use crate::error::{ErrorKind, TabulaResult};
use crate::schema::TableSchema;
use crate::statement::{Statement, StatementBuilder};
use crate::types::{BackendValue, Row, Value};

/// Typed data access to one table.
///
/// Reads go through the shared [`QueryCache`] and writes invalidate the table's cached
/// reads once the backend accepted them. A [`Table`] is cheap to clone and every clone
/// observes the closed state of the [`crate::database::Database`] it belongs to.
pub struct Table<C> {
    schema: Arc<TableSchema>,
    builder: StatementBuilder,
    cache: QueryCache,
    connection: Arc<C>,
    closed: Arc<AtomicBool>,
}

impl<C> Table<C>
where
    C: Connection,
{
    pub(crate) fn new(
        schema: TableSchema,
        cache: QueryCache,
        connection: Arc<C>,
        closed: Arc<AtomicBool>,
    ) -> Self {
        let schema = Arc::new(schema);

        Self {
            builder: StatementBuilder::new(schema.clone()),
            schema,
            cache,
            connection,
            closed,
        }
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Issues the idempotent creation statement of the table.
    pub(crate) async fn create(&self) -> TabulaResult<()> {
        let statement = self.builder.build_create_statement();
        self.execute(&statement).await?;

        info!(table = self.name(), "table is ready");

        Ok(())
    }

    /// Returns the row whose primary key equals `key`, if any.
    pub async fn get(&self, key: impl Into<Value>) -> TabulaResult<Option<Row>> {
        self.ensure_open()?;

        let primary_key = self.schema.primary_key();
        let key = self.encode_key(key.into())?;
        let statement = self.builder.build_select_by_column(&primary_key.name, key)?;

        let result = self
            .cached_read(statement, |rows| CachedResult::One(rows.into_iter().next()))
            .await?;

        match result {
            CachedResult::One(row) => Ok(row),
            CachedResult::Many(rows) => Ok(rows.into_iter().next()),
        }
    }

    /// Returns every row whose `column` equals `value`.
    ///
    /// Lookups on the primary key column must go through [`Table::get`].
    pub async fn get_all(&self, column: &str, value: impl Into<Value>) -> TabulaResult<Vec<Row>> {
        self.ensure_open()?;

        let Some(spec) = self.schema.column(column) else {
            bail!(
                ErrorKind::QueryError,
                "Unknown column",
                format!("column `{column}` is not declared in table `{}`", self.name())
            );
        };

        if spec.is_primary {
            bail!(
                ErrorKind::QueryError,
                "Primary key lookup through get_all",
                format!(
                    "column `{column}` is the primary key of table `{}`, use get instead",
                    self.name()
                )
            );
        }

        let value = encode_value(spec.type_tag, &value.into())?;
        let statement = self.builder.build_select_by_column(column, value)?;

        let result = self.cached_read(statement, CachedResult::Many).await?;

        match result {
            CachedResult::Many(rows) => Ok(rows),
            CachedResult::One(row) => Ok(row.into_iter().collect()),
        }
    }

    /// Inserts `row`, which must supply a non-null value for every required column.
    ///
    /// Returns the number of affected rows.
    pub async fn insert(&self, row: Row) -> TabulaResult<u64> {
        self.ensure_open()?;

        for column in self.schema.columns() {
            if !column.is_required() {
                continue;
            }

            match row.get(&column.name) {
                None => bail!(
                    ErrorKind::ValidationError,
                    "Missing required column",
                    format!(
                        "column `{}` of table `{}` is required",
                        column.name,
                        self.name()
                    )
                ),
                Some(Value::Null) => bail!(
                    ErrorKind::ValidationError,
                    "Null value for required column",
                    format!(
                        "column `{}` of table `{}` cannot be null",
                        column.name,
                        self.name()
                    )
                ),
                Some(_) => {}
            }
        }

        let values = encode_row(&self.schema, &row)?;
        let statement = self.builder.build_insert(values)?;

        self.write(statement).await
    }

    /// Updates the columns supplied in `row` on the row identified by its primary key.
    ///
    /// Columns absent from `row` are left untouched. Returns the number of affected rows.
    pub async fn update(&self, mut row: Row) -> TabulaResult<u64> {
        self.ensure_open()?;

        let primary_key = self.schema.primary_key();
        let Some(key) = row.remove(&primary_key.name) else {
            bail!(
                ErrorKind::ValidationError,
                "Missing primary key",
                format!(
                    "updates of table `{}` must supply column `{}`",
                    self.name(),
                    primary_key.name
                )
            );
        };
        let key = self.encode_key(key)?;

        for (column, value) in row.iter() {
            let required = self
                .schema
                .column(column)
                .is_some_and(|spec| spec.is_required());
            if required && value.is_null() {
                bail!(
                    ErrorKind::ValidationError,
                    "Null value for required column",
                    format!("column `{column}` of table `{}` cannot be null", self.name())
                );
            }
        }

        let values = encode_row(&self.schema, &row)?;
        let statement = self.builder.build_update(values, key)?;

        self.write(statement).await
    }

    /// Deletes the row whose primary key equals `key`.
    ///
    /// Returns the number of affected rows.
    pub async fn delete(&self, key: impl Into<Value>) -> TabulaResult<u64> {
        self.ensure_open()?;

        let key = self.encode_key(key.into())?;
        let statement = self.builder.build_delete(key);

        self.write(statement).await
    }

    fn ensure_open(&self) -> TabulaResult<()> {
        if self.closed.load(Ordering::Acquire) {
            bail!(
                ErrorKind::ClosedError,
                "Database is closed",
                format!("table `{}` cannot be used after close", self.name())
            );
        }

        Ok(())
    }

    fn encode_key(&self, key: Value) -> TabulaResult<BackendValue> {
        let primary_key = self.schema.primary_key();
        if key.is_null() {
            bail!(
                ErrorKind::ValidationError,
                "Missing primary key",
                format!(
                    "column `{}` of table `{}` cannot be null",
                    primary_key.name,
                    self.name()
                )
            );
        }

        encode_value(primary_key.type_tag, &key)
    }

    /// Serves a read from the cache, or executes it and caches the decoded rows.
    ///
    /// The table's generation is taken before executing, so a write that completes while
    /// the read is in flight keeps its result out of the cache.
    async fn cached_read<F>(&self, statement: Statement, shape: F) -> TabulaResult<CachedResult>
    where
        F: FnOnce(Vec<Row>) -> CachedResult,
    {
        let key = CacheKey::new(self.name(), &statement);
        if let Some(result) = self.cache.lookup(&key).await {
            return Ok(result);
        }

        let generation = self.cache.generation(self.name()).await;
        let result = self.execute(&statement).await?;

        let rows = result
            .rows
            .into_iter()
            .map(|row| decode_row(&self.schema, row))
            .collect::<TabulaResult<Vec<_>>>()?;
        let result = shape(rows);

        self.cache.store(key, result.clone(), generation).await;

        Ok(result)
    }

    async fn write(&self, statement: Statement) -> TabulaResult<u64> {
        let result = self.execute(&statement).await?;
        self.cache.invalidate_table(self.name()).await;

        Ok(result.rows_affected)
    }

    async fn execute(&self, statement: &Statement) -> TabulaResult<QueryResult> {
        debug!(
            table = self.name(),
            sql = %statement.sql,
            params = statement.params.len(),
            "executing statement"
        );

        self.connection
            .execute(&statement.sql, &statement.params)
            .await
    }
}

impl<C> Clone for Table<C> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            builder: self.builder.clone(),
            cache: self.cache.clone(),
            connection: self.connection.clone(),
            closed: self.closed.clone(),
        }
    }
}

impl<C> fmt::Debug for Table<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("schema", &self.schema)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
