//! Tracing subscriber setup

use crate::config::LogConfig;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter from `RUST_LOG`, falling back to `default_level`
#[must_use]
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber
///
/// # Errors
/// If a global subscriber is already set.
pub fn init_tracing(config: &LogConfig) -> Result<(), TryInitError> {
    let json = config.json.then(|| fmt::layer().json().with_target(true));
    let text = (!config.json).then(|| fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(json)
        .with(text)
        .try_init()?;

    tracing::debug!(level = %config.level, json = config.json, "Tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails_instead_of_panicking() {
        let config = LogConfig::default().with_level("warn");
        // the first call may lose to another test in this binary
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
