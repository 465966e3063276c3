use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use std::fmt;

/// Unparsed type specification of a single column.
///
/// A column is declared either as a token string such as `"primary int"`, as a list whose
/// first element is the (possibly qualified) type name followed by type arguments, such as
/// `["varChar", 100]`, or as the JSON sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawColumnType {
    Token(String),
    List {
        type_name: String,
        arguments: Vec<u32>,
    },
    Json,
}

impl RawColumnType {
    pub fn token(token: impl Into<String>) -> Self {
        RawColumnType::Token(token.into())
    }

    pub fn list(type_name: impl Into<String>, arguments: impl IntoIterator<Item = u32>) -> Self {
        RawColumnType::List {
            type_name: type_name.into(),
            arguments: arguments.into_iter().collect(),
        }
    }
}

impl From<&str> for RawColumnType {
    fn from(token: &str) -> Self {
        RawColumnType::token(token)
    }
}

impl From<String> for RawColumnType {
    fn from(token: String) -> Self {
        RawColumnType::Token(token)
    }
}

impl<'de> Deserialize<'de> for RawColumnType {
    /// Deserializes either a token string or a `[type, args...]` sequence.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawColumnTypeVisitor;

        impl<'de> Visitor<'de> for RawColumnTypeVisitor {
            type Value = RawColumnType;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a column type string or a [type, arguments...] list")
            }

            fn visit_str<E>(self, value: &str) -> Result<RawColumnType, E>
            where
                E: de::Error,
            {
                Ok(RawColumnType::token(value))
            }

            fn visit_string<E>(self, value: String) -> Result<RawColumnType, E>
            where
                E: de::Error,
            {
                Ok(RawColumnType::Token(value))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<RawColumnType, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let type_name: String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;

                let mut arguments = Vec::new();
                while let Some(argument) = seq.next_element::<u32>()? {
                    arguments.push(argument);
                }

                Ok(RawColumnType::List {
                    type_name,
                    arguments,
                })
            }
        }

        deserializer.deserialize_any(RawColumnTypeVisitor)
    }
}

/// Unparsed schema of one table: column names mapped to their [`RawColumnType`], in
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTableSchema {
    columns: Vec<(String, RawColumnType)>,
}

impl RawTableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column declaration and returns the schema.
    pub fn column(mut self, name: impl Into<String>, column_type: impl Into<RawColumnType>) -> Self {
        self.columns.push((name.into(), column_type.into()));
        self
    }

    pub fn columns(&self) -> &[(String, RawColumnType)] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'de> Deserialize<'de> for RawTableSchema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawTableSchemaVisitor;

        impl<'de> Visitor<'de> for RawTableSchemaVisitor {
            type Value = RawTableSchema;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of column names to column types")
            }

            fn visit_map<V>(self, mut map: V) -> Result<RawTableSchema, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut columns = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, column_type)) = map.next_entry::<String, RawColumnType>()? {
                    columns.push((name, column_type));
                }

                Ok(RawTableSchema { columns })
            }
        }

        deserializer.deserialize_map(RawTableSchemaVisitor)
    }
}

/// Unparsed schema of a whole database: table names mapped to their [`RawTableSchema`], in
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseSchema {
    tables: Vec<(String, RawTableSchema)>,
}

impl DatabaseSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a table declaration and returns the schema.
    pub fn table(mut self, name: impl Into<String>, schema: RawTableSchema) -> Self {
        self.tables.push((name.into(), schema));
        self
    }

    pub fn tables(&self) -> &[(String, RawTableSchema)] {
        &self.tables
    }
}

impl<'de> Deserialize<'de> for DatabaseSchema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DatabaseSchemaVisitor;

        impl<'de> Visitor<'de> for DatabaseSchemaVisitor {
            type Value = DatabaseSchema;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of table names to table schemas")
            }

            fn visit_map<V>(self, mut map: V) -> Result<DatabaseSchema, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut tables = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, schema)) = map.next_entry::<String, RawTableSchema>()? {
                    tables.push((name, schema));
                }

                Ok(DatabaseSchema { tables })
            }
        }

        deserializer.deserialize_map(DatabaseSchemaVisitor)
    }
}
