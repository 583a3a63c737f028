use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Calling this more
/// than once is harmless: later calls leave the first subscriber in place.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_level(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .try_init();
}
