//! Tracing setup.
//!
//! `RUST_LOG` overrides the default filter. Production logs are JSON
//! lines; development logs are human-readable.

use tracing_subscriber::EnvFilter;

use crate::config::RuntimeEnv;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,storefront=debug,sqlx=warn";

/// Installs the global subscriber.
pub fn init_tracing(env: RuntimeEnv) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match env {
        RuntimeEnv::Production => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .init(),
        RuntimeEnv::Development => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}
