//! Utilities for testing code built on tabula without a real backend.
//!
//! [`memory_connection::MemoryConnection`] stands in for a database server and
//! [`schema`] provides the declarations shared by the tests.

pub mod memory_connection;
pub mod schema;
