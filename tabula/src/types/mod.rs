//! Value and row types flowing between callers, the codec and the connection.
//!
//! [`Value`] and [`Row`] live in the application domain, [`BackendValue`] and [`RawRow`]
//! in the wire domain understood by a [`crate::connection::Connection`].

mod row;
mod value;

pub use row::*;
pub use value::*;
