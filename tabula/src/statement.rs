use std::sync::Arc;

use crate::bail;
use crate::error::{ErrorKind, TabulaResult};
use crate::schema::{ColumnSpec, TableSchema};
use crate::types::BackendValue;

/// A SQL statement with its bound parameters.
///
/// Identifiers are embedded in `sql` directly; values only ever travel in `params`, one per
/// `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<BackendValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<BackendValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Leading keywords of statements that read without changing any table.
const READ_KEYWORDS: &[&str] = &["SELECT", "SHOW", "DESCRIBE", "DESC", "EXPLAIN"];

/// Keywords that make a `WITH` statement change data.
const WRITE_KEYWORDS: &[&str] = &["INSERT", "UPDATE", "DELETE", "REPLACE"];

/// Returns whether `sql` only reads, returning rows without changing any table.
///
/// Leading parentheses are skipped, and a `WITH` statement reads unless its main statement
/// is a write.
pub fn is_read_only(sql: &str) -> bool {
    let mut tokens = sql
        .split(|c: char| c.is_whitespace() || c == '(' || c == ')' || c == ',' || c == ';')
        .filter(|token| !token.is_empty());
    let is_any = |token: &str, keywords: &[&str]| {
        keywords
            .iter()
            .any(|keyword| token.eq_ignore_ascii_case(keyword))
    };

    match tokens.next() {
        Some(first) if first.eq_ignore_ascii_case("WITH") => {
            !tokens.any(|token| is_any(token, WRITE_KEYWORDS))
        }
        Some(first) => is_any(first, READ_KEYWORDS),
        None => false,
    }
}

/// Builds the statements of one table from its [`TableSchema`].
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    schema: Arc<TableSchema>,
}

impl StatementBuilder {
    pub fn new(schema: Arc<TableSchema>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Generates the `CREATE TABLE IF NOT EXISTS` statement of the table.
    ///
    /// Required columns are `NOT NULL`, unique columns carry `UNIQUE` and the primary key is
    /// declared last. The output only depends on the schema.
    pub fn build_create_statement(&self) -> Statement {
        let mut definitions = self
            .schema
            .columns()
            .iter()
            .map(column_definition)
            .collect::<Vec<_>>();
        definitions.push(format!("PRIMARY KEY ({})", self.schema.primary_key().name));

        Statement::new(
            format!(
                "CREATE TABLE IF NOT EXISTS {} ({})",
                self.schema.name(),
                definitions.join(", ")
            ),
            Vec::new(),
        )
    }

    /// Generates a select of every column filtered by equality on `column`.
    pub fn build_select_by_column(
        &self,
        column: &str,
        value: BackendValue,
    ) -> TabulaResult<Statement> {
        self.check_column(column)?;

        Ok(Statement::new(
            format!(
                "SELECT {} FROM {} WHERE {column} = ?",
                self.select_list(),
                self.schema.name()
            ),
            vec![value],
        ))
    }

    /// Generates an insert of the given encoded columns.
    pub fn build_insert(&self, values: Vec<(String, BackendValue)>) -> TabulaResult<Statement> {
        if values.is_empty() {
            bail!(
                ErrorKind::ValidationError,
                "Empty insert",
                format!("no columns supplied for table `{}`", self.schema.name())
            );
        }

        let mut columns = Vec::with_capacity(values.len());
        let mut params = Vec::with_capacity(values.len());
        for (column, value) in values {
            self.check_column(&column)?;
            columns.push(column);
            params.push(value);
        }

        let placeholders = vec!["?"; columns.len()].join(", ");
        Ok(Statement::new(
            format!(
                "INSERT INTO {} ({}) VALUES ({placeholders})",
                self.schema.name(),
                columns.join(", ")
            ),
            params,
        ))
    }

    /// Generates an update of the given encoded columns on the row identified by `key`.
    ///
    /// The primary key column is never assigned, even when present in `values`.
    pub fn build_update(
        &self,
        values: Vec<(String, BackendValue)>,
        key: BackendValue,
    ) -> TabulaResult<Statement> {
        let primary_key = &self.schema.primary_key().name;

        let mut assignments = Vec::with_capacity(values.len());
        let mut params = Vec::with_capacity(values.len() + 1);
        for (column, value) in values {
            self.check_column(&column)?;
            if &column == primary_key {
                continue;
            }
            assignments.push(format!("{column} = ?"));
            params.push(value);
        }

        if assignments.is_empty() {
            bail!(
                ErrorKind::ValidationError,
                "Empty update",
                format!(
                    "no columns besides `{primary_key}` supplied for table `{}`",
                    self.schema.name()
                )
            );
        }

        params.push(key);
        Ok(Statement::new(
            format!(
                "UPDATE {} SET {} WHERE {primary_key} = ?",
                self.schema.name(),
                assignments.join(", ")
            ),
            params,
        ))
    }

    /// Generates a delete of the row identified by `key`.
    pub fn build_delete(&self, key: BackendValue) -> Statement {
        Statement::new(
            format!(
                "DELETE FROM {} WHERE {} = ?",
                self.schema.name(),
                self.schema.primary_key().name
            ),
            vec![key],
        )
    }

    fn select_list(&self) -> String {
        self.schema.column_names().collect::<Vec<_>>().join(", ")
    }

    fn check_column(&self, column: &str) -> TabulaResult<&ColumnSpec> {
        match self.schema.column(column) {
            Some(spec) => Ok(spec),
            None => bail!(
                ErrorKind::QueryError,
                "Unknown column",
                format!(
                    "column `{column}` is not declared in table `{}`",
                    self.schema.name()
                )
            ),
        }
    }
}

fn column_definition(column: &ColumnSpec) -> String {
    let mut definition = format!("{} {}", column.name, column.type_tag);
    if column.is_required() {
        definition.push_str(" NOT NULL");
    }
    if column.is_unique {
        definition.push_str(" UNIQUE");
    }

    definition
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_read_only() {
        assert!(is_read_only("SELECT id FROM people WHERE id = ?"));
        assert!(is_read_only("  select * from people"));
        assert!(is_read_only("(SELECT 1) UNION (SELECT 2)"));
        assert!(is_read_only("show tables"));
        assert!(is_read_only(
            "WITH adults AS (SELECT id FROM people) SELECT id FROM adults"
        ));
        assert!(!is_read_only(
            "WITH old AS (SELECT id FROM people) DELETE FROM people WHERE id IN (SELECT id FROM old)"
        ));
        assert!(!is_read_only("DELETE FROM people"));
        assert!(!is_read_only("CREATE TABLE IF NOT EXISTS people (id int NOT NULL)"));
        assert!(!is_read_only(""));
    }
    use crate::schema::{RawColumnType, RawTableSchema};

    fn builder() -> StatementBuilder {
        let raw = RawTableSchema::new()
            .column("id", "primary int")
            .column("name", RawColumnType::list("varChar", [100]))
            .column("born", "optional date");

        StatementBuilder::new(Arc::new(TableSchema::parse("people", &raw).unwrap()))
    }

    #[test]
    fn test_create_statement_for_people() {
        let statement = builder().build_create_statement();

        assert_eq!(
            statement.sql,
            "CREATE TABLE IF NOT EXISTS people (id int NOT NULL, name varChar(100) NOT NULL, \
             born date, PRIMARY KEY (id))"
        );
        assert!(statement.params.is_empty());
        assert_eq!(statement, builder().build_create_statement());
    }

    #[test]
    fn test_unique_columns_are_marked() {
        let raw = RawTableSchema::new()
            .column("id", "primary int")
            .column("email", RawColumnType::list("unique varChar", [255]));
        let builder = StatementBuilder::new(Arc::new(TableSchema::parse("users", &raw).unwrap()));

        assert!(
            builder
                .build_create_statement()
                .sql
                .contains("email varChar(255) NOT NULL UNIQUE")
        );
    }

    #[test]
    fn test_select_binds_value() {
        let statement = builder()
            .build_select_by_column("name", BackendValue::from("Dave"))
            .unwrap();

        assert_eq!(
            statement.sql,
            "SELECT id, name, born FROM people WHERE name = ?"
        );
        assert_eq!(statement.params, vec![BackendValue::from("Dave")]);
    }

    #[test]
    fn test_unknown_columns_are_query_errors() {
        let err = builder()
            .build_select_by_column("age", BackendValue::Int(3))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QueryError);

        let err = builder()
            .build_insert(vec![("age".to_string(), BackendValue::Int(3))])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QueryError);
    }

    #[test]
    fn test_insert_uses_placeholders() {
        let statement = builder()
            .build_insert(vec![
                ("id".to_string(), BackendValue::Int(1)),
                ("name".to_string(), BackendValue::from("Dave")),
            ])
            .unwrap();

        assert_eq!(statement.sql, "INSERT INTO people (id, name) VALUES (?, ?)");
        assert_eq!(statement.params.len(), 2);
    }

    #[test]
    fn test_update_never_sets_primary_key() {
        let statement = builder()
            .build_update(
                vec![
                    ("id".to_string(), BackendValue::Int(1)),
                    ("name".to_string(), BackendValue::from("Bob")),
                ],
                BackendValue::Int(1),
            )
            .unwrap();

        assert_eq!(statement.sql, "UPDATE people SET name = ? WHERE id = ?");
        assert_eq!(
            statement.params,
            vec![BackendValue::from("Bob"), BackendValue::Int(1)]
        );

        let err = builder()
            .build_update(
                vec![("id".to_string(), BackendValue::Int(1))],
                BackendValue::Int(1),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[test]
    fn test_delete_by_primary_key() {
        let statement = builder().build_delete(BackendValue::Int(4));

        assert_eq!(statement.sql, "DELETE FROM people WHERE id = ?");
        assert_eq!(statement.params, vec![BackendValue::Int(4)]);
    }
}
