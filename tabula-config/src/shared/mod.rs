mod base;
mod database;

pub use base::*;
pub use database::*;
