use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::SerializableSecretString;
use crate::shared::ValidationError;

/// How long read results stay cached when no TTL is configured.
pub const DEFAULT_CACHE_TTL_SECS: i64 = 300;

/// Port used when [`DatabaseOptions::port`] is not set.
pub const DEFAULT_PORT: u16 = 3306;

/// Connection and caching options for a tabula database.
///
/// The connection fields are consumed by whichever connection collaborator is in use,
/// while [`DatabaseOptions::cache_ttl`] drives the read cache of the database itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseOptions {
    /// Hostname or IP address of the database server.
    pub host: String,
    /// Port number of the database server, [`DEFAULT_PORT`] when unset.
    #[serde(default)]
    pub port: Option<u16>,
    /// Username used to authenticate.
    pub user: String,
    /// Password for the user. Redacted in debug output.
    #[serde(default)]
    pub password: Option<SerializableSecretString>,
    /// Name of the database to connect to.
    pub database: String,
    /// Cache time-to-live in seconds. Unset or zero means [`DEFAULT_CACHE_TTL_SECS`],
    /// a negative value disables caching.
    #[serde(default)]
    pub cache_ttl: Option<i64>,
}

/// Resolved cache policy derived from [`DatabaseOptions::cache_ttl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTtl {
    /// Read results are never cached.
    Disabled,
    /// Read results are cached for the given duration.
    Expiring(Duration),
}

impl CacheTtl {
    /// Resolves a raw TTL in seconds into a [`CacheTtl`].
    pub fn from_secs(ttl: Option<i64>) -> CacheTtl {
        match ttl {
            Some(ttl) if ttl < 0 => CacheTtl::Disabled,
            Some(ttl) if ttl > 0 => CacheTtl::Expiring(Duration::from_secs(ttl as u64)),
            _ => CacheTtl::Expiring(Duration::from_secs(DEFAULT_CACHE_TTL_SECS as u64)),
        }
    }
}

impl Default for CacheTtl {
    fn default() -> Self {
        CacheTtl::from_secs(None)
    }
}

impl DatabaseOptions {
    /// Returns the configured port or [`DEFAULT_PORT`].
    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Returns the resolved cache policy.
    pub fn cache_ttl(&self) -> CacheTtl {
        CacheTtl::from_secs(self.cache_ttl)
    }

    /// Validates the [`DatabaseOptions`].
    ///
    /// Host, user and database must be non-empty and an explicit port must be non-zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.trim().is_empty() {
            return Err(ValidationError::EmptyField("host"));
        }
        if self.user.trim().is_empty() {
            return Err(ValidationError::EmptyField("user"));
        }
        if self.database.trim().is_empty() {
            return Err(ValidationError::EmptyField("database"));
        }
        if self.port == Some(0) {
            return Err(ValidationError::PortZero);
        }

        Ok(())
    }
}
