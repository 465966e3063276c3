use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was left empty.
    #[error("`{0}` cannot be empty")]
    EmptyField(&'static str),
    /// The port was explicitly set to zero.
    #[error("`port` cannot be zero")]
    PortZero,
}
