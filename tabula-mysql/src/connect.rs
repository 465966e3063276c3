use secrecy::ExposeSecret;
use serde::Deserialize;
use sqlx::mysql::MySqlConnectOptions;
use tabula::database::Database;
use tabula::error::{ErrorKind, TabulaResult};
use tabula::schema::DatabaseSchema;
use tabula::tabula_error;
use tabula_config::Config;
use tabula_config::shared::DatabaseOptions;
use tracing::info;

use crate::connection::MySqlConnection;

/// Converts connection configuration into driver connect options.
pub trait IntoConnectOptions<Output> {
    /// Creates options for connecting to the server without selecting a database.
    fn without_db(&self) -> Output;

    /// Creates options for connecting to the configured database.
    fn with_db(&self) -> Output;
}

impl IntoConnectOptions<MySqlConnectOptions> for DatabaseOptions {
    fn without_db(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port_or_default())
            .username(&self.user);

        if let Some(password) = &self.password {
            options = options.password(password.expose_secret());
        }

        options
    }

    fn with_db(&self) -> MySqlConnectOptions {
        let options: MySqlConnectOptions = self.without_db();
        options.database(&self.database)
    }
}

/// Configuration of a MySQL-backed database, loadable with [`tabula_config::load_config`].
///
/// ```yaml
/// database:
///   host: localhost
///   user: tabula
///   database: club
///   cache_ttl: 300
/// schema:
///   people:
///     id: primary int
///     name: [varChar, 100]
///     born: optional date
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct MySqlDatabaseConfig {
    pub database: DatabaseOptions,
    pub schema: DatabaseSchema,
}

impl Config for MySqlDatabaseConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &[];
}

impl MySqlDatabaseConfig {
    /// Connects with [`connect_database`].
    pub async fn connect(self) -> TabulaResult<Database<MySqlConnection>> {
        connect_database(&self.database, self.schema).await
    }
}

/// Validates `options`, connects to MySQL and builds a [`Database`] for `schema`.
///
/// The cache TTL is taken from [`DatabaseOptions::cache_ttl`].
pub async fn connect_database(
    options: &DatabaseOptions,
    schema: DatabaseSchema,
) -> TabulaResult<Database<MySqlConnection>> {
    options.validate().map_err(|err| {
        tabula_error!(
            ErrorKind::ValidationError,
            "Invalid database options",
            err,
            source: err
        )
    })?;

    let connection = MySqlConnection::connect(&options.with_db()).await?;
    info!(
        host = %options.host,
        port = options.port_or_default(),
        database = %options.database,
        "connected to MySQL"
    );

    Database::new(connection, options.cache_ttl(), schema).await
}
