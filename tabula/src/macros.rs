//! Macros for creating [`crate::error::TabulaError`] instances with less boilerplate.

/// Creates a [`crate::error::TabulaError`] from error kind and description.
///
/// Accepts an optional dynamic detail (anything implementing `ToString`, or an owned
/// [`String`] moved with `detail =`) and an optional `source:` error.
#[macro_export]
macro_rules! tabula_error {
    ($kind:expr, $desc:expr) => {
        $crate::error::TabulaError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, source: $source:expr) => {
        $crate::error::TabulaError::from(($kind, $desc)).with_source($source)
    };
    ($kind:expr, $desc:expr, detail = $detail:expr) => {
        $crate::error::TabulaError::from(($kind, $desc, $detail))
    };
    ($kind:expr, $desc:expr, detail = $detail:expr, source: $source:expr) => {
        $crate::error::TabulaError::from(($kind, $desc, $detail)).with_source($source)
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        $crate::error::TabulaError::from(($kind, $desc, $detail.to_string()))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        $crate::error::TabulaError::from(($kind, $desc, $detail.to_string()))
            .with_source($source)
    };
}

/// Creates a [`crate::error::TabulaError`] and returns it from the current function.
///
/// Supports the same arguments as [`tabula_error!`].
#[macro_export]
macro_rules! bail {
    ($kind:expr, $desc:expr) => {
        return ::core::result::Result::Err($crate::tabula_error!($kind, $desc))
    };
    ($kind:expr, $desc:expr, source: $source:expr) => {
        return ::core::result::Result::Err($crate::tabula_error!($kind, $desc, source: $source))
    };
    ($kind:expr, $desc:expr, detail = $detail:expr) => {
        return ::core::result::Result::Err($crate::tabula_error!($kind, $desc, detail = $detail))
    };
    ($kind:expr, $desc:expr, detail = $detail:expr, source: $source:expr) => {
        return ::core::result::Result::Err($crate::tabula_error!(
            $kind,
            $desc,
            detail = $detail,
            source: $source
        ))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        return ::core::result::Result::Err($crate::tabula_error!($kind, $desc, $detail))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        return ::core::result::Result::Err($crate::tabula_error!(
            $kind,
            $desc,
            $detail,
            source: $source
        ))
    };
}
