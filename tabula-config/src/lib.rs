//! Configuration types shared by the tabula crates.
//!
//! Holds the database connection options, the runtime [`Environment`] and the
//! hierarchical [`load_config`] loader used by binaries embedding tabula.

mod environment;
mod load;
mod secret;
pub mod shared;

pub use environment::Environment;
pub use load::{Config, LoadConfigError, load_config, load_config_from};
pub use secret::SerializableSecretString;
