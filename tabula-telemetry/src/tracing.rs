use std::sync::Once;

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter applied when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info";

/// Filter applied to test runs when `RUST_LOG` is not set.
const DEFAULT_TEST_FILTER: &str = "tabula=debug";

static TEST_TRACING: Once = Once::new();

/// Installs the global tracing subscriber for an application.
///
/// Log levels come from `RUST_LOG`. Without it, everything logs at `info` and the
/// `app_name` target is enabled explicitly.
pub fn init_tracing(app_name: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{DEFAULT_FILTER},{app_name}=info")));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
}

/// Installs a test-friendly subscriber exactly once per process.
///
/// Output goes through the test writer so it is captured per test and only shown on
/// failure.
pub fn init_test_tracing() {
    TEST_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_FILTER));

        // Another harness may have installed a global subscriber already.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}
