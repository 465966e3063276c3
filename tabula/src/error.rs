//! Error types and result definitions for tabula operations.
//!
//! Every failure surfaced by the data-access layer is a [`TabulaError`] classified by an
//! [`ErrorKind`], so callers can tell schema, validation, query, codec and lifecycle
//! failures apart without string matching.

use std::borrow::Cow;
use std::error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Convenient result type for tabula operations.
pub type TabulaResult<T> = Result<T, TabulaError>;

/// Categories of errors produced by the data-access layer.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The declared schema is invalid. Raised while constructing a database.
    SchemaError,
    /// A row is missing data required by the operation. Raised before any statement
    /// is built.
    ValidationError,
    /// An unknown table or column was referenced, or the backend rejected a statement.
    QueryError,
    /// A value could not be converted between the application and backend domains.
    CodecError,
    /// The database was closed before the operation was issued.
    ClosedError,
}

/// Main error type for tabula operations.
///
/// Carries a classification, a static description, optional dynamic detail, an optional
/// originating error and the location where it was created.
#[derive(Debug, Clone)]
pub struct TabulaError {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
}

impl TabulaError {
    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the static description of this error.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the dynamic detail of this error, if any.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the callsite where this error was created.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Attaches an originating error and returns the modified instance.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        TabulaError {
            kind,
            description,
            detail,
            source,
            location: Location::caller(),
        }
    }
}

impl PartialEq for TabulaError {
    fn eq(&self, other: &TabulaError) -> bool {
        self.kind == other.kind && self.description == other.description
    }
}

impl fmt::Display for TabulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}] {} @ {}:{}:{}",
            self.kind,
            self.description,
            self.location.file(),
            self.location.line(),
            self.location.column()
        )?;

        if let Some(detail) = &self.detail {
            write!(f, "\n  Detail:")?;
            for line in detail.lines() {
                if line.trim().is_empty() {
                    write!(f, "\n  ")?;
                } else {
                    write!(f, "\n    {line}")?;
                }
            }
        }

        Ok(())
    }
}

impl error::Error for TabulaError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn error::Error + 'static))
    }
}

/// Creates a [`TabulaError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for TabulaError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> TabulaError {
        TabulaError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

/// Creates a [`TabulaError`] from an error kind, static description, and dynamic detail.
impl<D> From<(ErrorKind, &'static str, D)> for TabulaError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> TabulaError {
        TabulaError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

/// Converts [`serde_json::Error`] into a [`ErrorKind::CodecError`].
impl From<serde_json::Error> for TabulaError {
    #[track_caller]
    fn from(err: serde_json::Error) -> TabulaError {
        let description = match err.classify() {
            serde_json::error::Category::Io => "JSON encoding failed",
            serde_json::error::Category::Syntax
            | serde_json::error::Category::Data
            | serde_json::error::Category::Eof => "JSON decoding failed",
        };

        let detail = err.to_string();
        TabulaError::from_components(
            ErrorKind::CodecError,
            Cow::Borrowed(description),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

/// Converts [`chrono::ParseError`] into a [`ErrorKind::CodecError`].
impl From<chrono::ParseError> for TabulaError {
    #[track_caller]
    fn from(err: chrono::ParseError) -> TabulaError {
        let detail = err.to_string();
        TabulaError::from_components(
            ErrorKind::CodecError,
            Cow::Borrowed("Date or time parsing failed"),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

/// Converts [`std::num::ParseIntError`] into a [`ErrorKind::CodecError`].
impl From<std::num::ParseIntError> for TabulaError {
    #[track_caller]
    fn from(err: std::num::ParseIntError) -> TabulaError {
        let detail = err.to_string();
        TabulaError::from_components(
            ErrorKind::CodecError,
            Cow::Borrowed("Integer parsing failed"),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

/// Converts [`std::num::ParseFloatError`] into a [`ErrorKind::CodecError`].
impl From<std::num::ParseFloatError> for TabulaError {
    #[track_caller]
    fn from(err: std::num::ParseFloatError) -> TabulaError {
        let detail = err.to_string();
        TabulaError::from_components(
            ErrorKind::CodecError,
            Cow::Borrowed("Float parsing failed"),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}
