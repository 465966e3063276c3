use std::fmt;
use std::str::FromStr;

use crate::bail;
use crate::error::{ErrorKind, TabulaError};

/// The closed set of column types a schema can declare.
///
/// Each tag has a fixed backend type name and a codec pair in
/// [`crate::conversions::codec`]. Length-parameterized types carry their length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Int,
    Double,
    Boolean,
    Date,
    DateTime,
    TimeStamp,
    Time,
    Text,
    MediumText,
    LongText,
    VarChar(u32),
    Char(u32),
    Json,
}

/// Base type names without their arguments, as written in schema declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeName {
    Int,
    Double,
    Boolean,
    Date,
    DateTime,
    TimeStamp,
    Time,
    Text,
    MediumText,
    LongText,
    VarChar,
    Char,
    Json,
}

impl TypeName {
    /// Returns the declaration token of this type, which is also its backend type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeName::Int => "int",
            TypeName::Double => "double",
            TypeName::Boolean => "boolean",
            TypeName::Date => "date",
            TypeName::DateTime => "dateTime",
            TypeName::TimeStamp => "timeStamp",
            TypeName::Time => "time",
            TypeName::Text => "text",
            TypeName::MediumText => "mediumText",
            TypeName::LongText => "longText",
            TypeName::VarChar => "varChar",
            TypeName::Char => "char",
            TypeName::Json => "json",
        }
    }

    /// Returns how many positional arguments the type requires.
    pub fn arity(&self) -> usize {
        match self {
            TypeName::VarChar | TypeName::Char => 1,
            _ => 0,
        }
    }

    /// Binds positional arguments to the type, producing a [`TypeTag`].
    pub fn bind(self, arguments: &[u32]) -> Result<TypeTag, TabulaError> {
        if arguments.len() != self.arity() {
            bail!(
                ErrorKind::SchemaError,
                "Wrong number of type arguments",
                format!(
                    "type `{}` takes {} argument(s), got {}",
                    self.as_str(),
                    self.arity(),
                    arguments.len()
                )
            );
        }

        let tag = match self {
            TypeName::Int => TypeTag::Int,
            TypeName::Double => TypeTag::Double,
            TypeName::Boolean => TypeTag::Boolean,
            TypeName::Date => TypeTag::Date,
            TypeName::DateTime => TypeTag::DateTime,
            TypeName::TimeStamp => TypeTag::TimeStamp,
            TypeName::Time => TypeTag::Time,
            TypeName::Text => TypeTag::Text,
            TypeName::MediumText => TypeTag::MediumText,
            TypeName::LongText => TypeTag::LongText,
            TypeName::Json => TypeTag::Json,
            TypeName::VarChar | TypeName::Char => {
                let length = arguments[0];
                if length == 0 {
                    bail!(
                        ErrorKind::SchemaError,
                        "Invalid type argument",
                        format!("type `{}` requires a positive length", self.as_str())
                    );
                }

                if self == TypeName::VarChar {
                    TypeTag::VarChar(length)
                } else {
                    TypeTag::Char(length)
                }
            }
        };

        Ok(tag)
    }
}

impl FromStr for TypeName {
    type Err = TabulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = match s {
            "int" => TypeName::Int,
            "double" => TypeName::Double,
            "boolean" => TypeName::Boolean,
            "date" => TypeName::Date,
            "dateTime" => TypeName::DateTime,
            "timeStamp" => TypeName::TimeStamp,
            "time" => TypeName::Time,
            "text" => TypeName::Text,
            "mediumText" => TypeName::MediumText,
            "longText" => TypeName::LongText,
            "varChar" => TypeName::VarChar,
            "char" => TypeName::Char,
            "json" => TypeName::Json,
            other => bail!(
                ErrorKind::SchemaError,
                "Unknown column type",
                format!("`{other}` is not a supported column type")
            ),
        };

        Ok(name)
    }
}

impl TypeTag {
    /// Returns the base type name of this tag.
    pub fn name(&self) -> TypeName {
        match self {
            TypeTag::Int => TypeName::Int,
            TypeTag::Double => TypeName::Double,
            TypeTag::Boolean => TypeName::Boolean,
            TypeTag::Date => TypeName::Date,
            TypeTag::DateTime => TypeName::DateTime,
            TypeTag::TimeStamp => TypeName::TimeStamp,
            TypeTag::Time => TypeName::Time,
            TypeTag::Text => TypeName::Text,
            TypeTag::MediumText => TypeName::MediumText,
            TypeTag::LongText => TypeName::LongText,
            TypeTag::VarChar(_) => TypeName::VarChar,
            TypeTag::Char(_) => TypeName::Char,
            TypeTag::Json => TypeName::Json,
        }
    }

    /// Returns the backend type name without arguments.
    pub fn backend_type_name(&self) -> &'static str {
        self.name().as_str()
    }

    /// Returns the type arguments rendered into the column definition.
    pub fn arguments(&self) -> Vec<u32> {
        match self {
            TypeTag::VarChar(length) | TypeTag::Char(length) => vec![*length],
            _ => Vec::new(),
        }
    }
}

/// Renders the full backend type, such as `varChar(100)`.
impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.backend_type_name())?;

        let arguments = self.arguments();
        if !arguments.is_empty() {
            let rendered = arguments
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, "({rendered})")?;
        }

        Ok(())
    }
}
