//! Subscriber set-up from the logging configuration.
//!
//! `RUST_LOG`, when set, takes precedence over the configured level and the
//! `metarev::sync` debug switch.

use metarev_core::config::LoggingConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails when the directives do not parse or a subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.is_empty() => EnvFilter::try_new(directives)?,
        _ => EnvFilter::try_new(config.filter_directives())?,
    };

    let registry = Registry::default().with(filter);
    if config.format == "json" {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }
    Ok(())
}
