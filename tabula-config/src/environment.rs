use std::fmt;
use std::io::Error;

/// Name of the environment variable selecting the configuration environment.
const ENVIRONMENT_ENV_NAME: &str = "TABULA_ENVIRONMENT";

/// The name of the development environment.
const DEV_ENV_NAME: &str = "dev";

/// The name of the test environment.
const TEST_ENV_NAME: &str = "test";

/// The name of the production environment.
const PROD_ENV_NAME: &str = "prod";

/// Runtime environment selecting which configuration overrides are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Development environment, the default.
    Dev,
    /// Environment used by integration tests.
    Test,
    /// Production environment.
    Prod,
}

impl Environment {
    /// Loads the environment from the `TABULA_ENVIRONMENT` env variable, falling back to
    /// [`Environment::Dev`] when it is unset.
    pub fn load() -> Result<Environment, Error> {
        std::env::var(ENVIRONMENT_ENV_NAME)
            .unwrap_or_else(|_| DEV_ENV_NAME.into())
            .try_into()
    }

    /// Returns the string name of the environment, which is also the stem of its
    /// configuration file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => DEV_ENV_NAME,
            Environment::Test => TEST_ENV_NAME,
            Environment::Prod => PROD_ENV_NAME,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Environment {
    type Error = Error;

    /// Parses an [`Environment`] case-insensitively.
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            DEV_ENV_NAME => Ok(Self::Dev),
            TEST_ENV_NAME => Ok(Self::Test),
            PROD_ENV_NAME => Ok(Self::Prod),
            other => Err(Error::other(format!(
                "{other} is not a supported environment. Use `{DEV_ENV_NAME}`, `{TEST_ENV_NAME}` or `{PROD_ENV_NAME}`.",
            ))),
        }
    }
}
