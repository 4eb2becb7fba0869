//! Tracing and logging setup
//!
//! Configures the `tracing` subscriber from the `LOG_LEVEL` / `LOG_FORMAT`
//! settings, with `RUST_LOG` taking precedence over the configured level.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::config::{LogConfig, LogFormat};

/// Initialize the tracing subscriber.
///
/// # Panics
/// Panics if a subscriber is already set; use [`try_init_tracing`] in tests.
pub fn init_tracing(config: &LogConfig) {
    if let Err(e) = try_init_tracing(config) {
        panic!("failed to initialize tracing: {e}");
    }
}

/// Try to initialize the tracing subscriber.
///
/// Unlike [`init_tracing`], this does not panic when called more than once.
pub fn try_init_tracing(config: &LogConfig) -> Result<(), TracingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_tracing_level().to_string()));

    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .try_init()
            .map_err(|_| TracingError::AlreadyInitialized),
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .try_init()
            .map_err(|_| TracingError::AlreadyInitialized),
    }
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}
