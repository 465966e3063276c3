//! Tracing setup shared by tabula binaries and tests.

pub mod tracing;

pub use crate::tracing::{init_test_tracing, init_tracing};
