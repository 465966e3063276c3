use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::bail;
use crate::error::{ErrorKind, TabulaResult};
use crate::schema::raw::{RawColumnType, RawTableSchema};
use crate::schema::type_tag::{TypeName, TypeTag};

/// Prefix reserved for internal names; tables and columns may not start with it.
pub const RESERVED_PREFIX: &str = "_";

/// Names of facade and database operations, which tables and columns may not shadow.
pub const RESERVED_NAMES: &[&str] = &[
    "get", "getAll", "get_all", "insert", "update", "delete", "close", "execute", "query",
];

/// MySQL reserved words. Identifiers are embedded unquoted, so none of these may name a
/// table or a column. Compared case-insensitively.
pub const RESERVED_KEYWORDS: &[&str] = &[
    "ACCESSIBLE", "ADD", "ALL", "ALTER", "ANALYZE", "AND", "AS", "ASC", "ASENSITIVE", "BEFORE",
    "BETWEEN", "BIGINT", "BINARY", "BLOB", "BOTH", "BY", "CALL", "CASCADE", "CASE", "CHANGE",
    "CHAR", "CHARACTER", "CHECK", "COLLATE", "COLUMN", "CONDITION", "CONSTRAINT", "CONTINUE",
    "CONVERT", "CREATE", "CROSS", "CUBE", "CUME_DIST", "CURRENT_DATE", "CURRENT_TIME",
    "CURRENT_TIMESTAMP", "CURRENT_USER", "CURSOR", "DATABASE", "DATABASES", "DAY_HOUR",
    "DAY_MICROSECOND", "DAY_MINUTE", "DAY_SECOND", "DEC", "DECIMAL", "DECLARE", "DEFAULT",
    "DELAYED", "DELETE", "DENSE_RANK", "DESC", "DESCRIBE", "DETERMINISTIC", "DISTINCT",
    "DISTINCTROW", "DIV", "DOUBLE", "DROP", "DUAL", "EACH", "ELSE", "ELSEIF", "EMPTY",
    "ENCLOSED", "ESCAPED", "EXCEPT", "EXISTS", "EXIT", "EXPLAIN", "FALSE", "FETCH",
    "FIRST_VALUE", "FLOAT", "FLOAT4", "FLOAT8", "FOR", "FORCE", "FOREIGN", "FROM", "FULLTEXT",
    "FUNCTION", "GENERATED", "GET", "GRANT", "GROUP", "GROUPING", "GROUPS", "HAVING",
    "HIGH_PRIORITY", "HOUR_MICROSECOND", "HOUR_MINUTE", "HOUR_SECOND", "IF", "IGNORE", "IN",
    "INDEX", "INFILE", "INNER", "INOUT", "INSENSITIVE", "INSERT", "INT", "INT1", "INT2", "INT3",
    "INT4", "INT8", "INTEGER", "INTERSECT", "INTERVAL", "INTO", "IO_AFTER_GTIDS",
    "IO_BEFORE_GTIDS", "IS", "ITERATE", "JOIN", "JSON_TABLE", "KEY", "KEYS", "KILL", "LAG",
    "LAST_VALUE", "LATERAL", "LEAD", "LEADING", "LEAVE", "LEFT", "LIKE", "LIMIT", "LINEAR",
    "LINES", "LOAD", "LOCALTIME", "LOCALTIMESTAMP", "LOCK", "LONG", "LONGBLOB", "LONGTEXT",
    "LOOP", "LOW_PRIORITY", "MASTER_BIND", "MASTER_SSL_VERIFY_SERVER_CERT", "MATCH",
    "MAXVALUE", "MEDIUMBLOB", "MEDIUMINT", "MEDIUMTEXT", "MIDDLEINT", "MINUTE_MICROSECOND",
    "MINUTE_SECOND", "MOD", "MODIFIES", "NATURAL", "NOT", "NO_WRITE_TO_BINLOG", "NTH_VALUE",
    "NTILE", "NULL", "NUMERIC", "OF", "ON", "OPTIMIZE", "OPTIMIZER_COSTS", "OPTION",
    "OPTIONALLY", "OR", "ORDER", "OUT", "OUTER", "OUTFILE", "OVER", "PARTITION",
    "PERCENT_RANK", "PRECISION", "PRIMARY", "PROCEDURE", "PURGE", "RANGE", "RANK", "READ",
    "READS", "READ_WRITE", "REAL", "RECURSIVE", "REFERENCES", "REGEXP", "RELEASE", "RENAME",
    "REPEAT", "REPLACE", "REQUIRE", "RESIGNAL", "RESTRICT", "RETURN", "REVOKE", "RIGHT",
    "RLIKE", "ROW", "ROWS", "ROW_NUMBER", "SCHEMA", "SCHEMAS", "SECOND_MICROSECOND", "SELECT",
    "SENSITIVE", "SEPARATOR", "SET", "SHOW", "SIGNAL", "SMALLINT", "SPATIAL", "SPECIFIC",
    "SQL", "SQLEXCEPTION", "SQLSTATE", "SQLWARNING", "SQL_BIG_RESULT", "SQL_CALC_FOUND_ROWS",
    "SQL_SMALL_RESULT", "SSL", "STARTING", "STORED", "STRAIGHT_JOIN", "SYSTEM", "TABLE",
    "TERMINATED", "THEN", "TINYBLOB", "TINYINT", "TINYTEXT", "TO", "TRAILING", "TRIGGER",
    "TRUE", "UNDO", "UNION", "UNIQUE", "UNLOCK", "UNSIGNED", "UPDATE", "USAGE", "USE", "USING",
    "UTC_DATE", "UTC_TIME", "UTC_TIMESTAMP", "VALUES", "VARBINARY", "VARCHAR", "VARCHARACTER",
    "VARYING", "VIRTUAL", "WHEN", "WHERE", "WHILE", "WINDOW", "WITH", "WRITE", "XOR",
    "YEAR_MONTH", "ZEROFILL",
];

/// Qualifier that may precede the base type in a column declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Qualifier {
    Primary,
    Optional,
    Unique,
}

impl FromStr for Qualifier {
    type Err = crate::error::TabulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(Qualifier::Primary),
            "optional" => Ok(Qualifier::Optional),
            "unique" => Ok(Qualifier::Unique),
            other => bail!(
                ErrorKind::SchemaError,
                "Unknown column qualifier",
                format!("`{other}` is not one of `primary`, `optional` or `unique`")
            ),
        }
    }
}

/// Normalized descriptor of a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub type_tag: TypeTag,
    /// Type arguments rendered in the column definition, e.g. the length of a `varChar`.
    pub arguments: Vec<u32>,
    pub is_primary: bool,
    pub is_optional: bool,
    pub is_unique: bool,
}

impl ColumnSpec {
    /// Parses the declaration of the column `name`.
    pub fn parse(name: &str, raw: &RawColumnType) -> TabulaResult<ColumnSpec> {
        let (token, arguments) = match raw {
            RawColumnType::Token(token) => (token.as_str(), &[][..]),
            RawColumnType::List {
                type_name,
                arguments,
            } => (type_name.as_str(), arguments.as_slice()),
            RawColumnType::Json => (TypeName::Json.as_str(), &[][..]),
        };

        let parts = token.split_whitespace().collect::<Vec<_>>();
        let (qualifier, type_name) = match parts.as_slice() {
            [type_name] => (None, *type_name),
            [qualifier, type_name] => (Some(qualifier.parse::<Qualifier>()?), *type_name),
            [] => bail!(
                ErrorKind::SchemaError,
                "Empty column type",
                format!("column `{name}` has no type")
            ),
            _ => bail!(
                ErrorKind::SchemaError,
                "Malformed column type",
                format!("column `{name}` has too many tokens in `{token}`")
            ),
        };

        let type_tag = type_name.parse::<TypeName>()?.bind(arguments)?;

        Ok(ColumnSpec {
            name: name.to_string(),
            type_tag,
            arguments: type_tag.arguments(),
            is_primary: qualifier == Some(Qualifier::Primary),
            is_optional: qualifier == Some(Qualifier::Optional),
            is_unique: qualifier == Some(Qualifier::Unique),
        })
    }

    /// Returns whether inserts must supply a non-null value for this column.
    pub fn is_required(&self) -> bool {
        !self.is_optional
    }
}

/// Validated, immutable schema of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnSpec>,
    primary_key: usize,
}

impl TableSchema {
    /// Parses and validates the raw schema of the table `name`.
    ///
    /// Fails with [`ErrorKind::SchemaError`] unless exactly one column is primary and every
    /// name is a usable, non-reserved identifier.
    pub fn parse(name: &str, raw: &RawTableSchema) -> TabulaResult<TableSchema> {
        validate_name("table", name)?;

        if raw.is_empty() {
            bail!(
                ErrorKind::SchemaError,
                "Table has no columns",
                format!("table `{name}` declares no columns")
            );
        }

        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(raw.columns().len());
        for (column_name, column_type) in raw.columns() {
            validate_name("column", column_name)?;

            if !seen.insert(column_name.as_str()) {
                bail!(
                    ErrorKind::SchemaError,
                    "Duplicate column",
                    format!("column `{column_name}` is declared twice in table `{name}`")
                );
            }

            columns.push(ColumnSpec::parse(column_name, column_type)?);
        }

        let primaries = columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.is_primary)
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        let primary_key = match primaries.as_slice() {
            [index] => *index,
            [] => bail!(
                ErrorKind::SchemaError,
                "Missing primary key",
                format!("table `{name}` has no primary column")
            ),
            _ => bail!(
                ErrorKind::SchemaError,
                "Multiple primary keys",
                format!(
                    "table `{name}` declares {} primary columns",
                    primaries.len()
                )
            ),
        };

        if columns[primary_key].type_tag == TypeTag::Json {
            bail!(
                ErrorKind::SchemaError,
                "Invalid primary key type",
                format!(
                    "primary column `{}` of table `{name}` cannot be json",
                    columns[primary_key].name
                )
            );
        }

        Ok(TableSchema {
            name: name.to_string(),
            columns,
            primary_key,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns in declaration order.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn primary_key(&self) -> &ColumnSpec {
        &self.columns[self.primary_key]
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }
}

impl fmt::Display for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Checks that `name` can be embedded as an identifier and is not reserved.
///
/// `kind` names what is being validated in the error detail, e.g. `"table"`.
pub fn validate_name(kind: &str, name: &str) -> TabulaResult<()> {
    if name.is_empty() {
        bail!(
            ErrorKind::SchemaError,
            "Empty name",
            format!("a {kind} name cannot be empty")
        );
    }

    if name.starts_with(RESERVED_PREFIX) {
        bail!(
            ErrorKind::SchemaError,
            "Reserved name prefix",
            format!("{kind} `{name}` starts with the reserved prefix `{RESERVED_PREFIX}`")
        );
    }

    if RESERVED_NAMES.contains(&name) {
        bail!(
            ErrorKind::SchemaError,
            "Reserved name",
            format!("{kind} `{name}` collides with an operation name")
        );
    }

    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_start || !valid_rest {
        bail!(
            ErrorKind::SchemaError,
            "Invalid identifier",
            format!("{kind} `{name}` must match [A-Za-z_][A-Za-z0-9_]*")
        );
    }

    if RESERVED_KEYWORDS
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(name))
    {
        bail!(
            ErrorKind::SchemaError,
            "Reserved keyword",
            format!("{kind} `{name}` is a reserved SQL keyword")
        );
    }

    Ok(())
}
