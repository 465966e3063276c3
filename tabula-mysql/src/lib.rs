//! MySQL [`tabula::connection::Connection`] built on a single `sqlx` connection.
//!
//! [`connect_database`] turns [`tabula_config::shared::DatabaseOptions`] into a ready
//! [`tabula::database::Database`].

mod connect;
mod connection;
mod decode;

pub use connect::{IntoConnectOptions, MySqlDatabaseConfig, connect_database};
pub use connection::MySqlConnection;
