//! Tracing subscriber initialisation

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;

/// Filter from the configured level, falling back to `info`
fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global subscriber
///
/// Development gets human-readable output; every other environment logs JSON.
/// Calling this twice is harmless: the second registration is ignored.
pub fn init_tracing(config: &Config) {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    let result = if config.is_development() {
        registry.with(fmt::layer().pretty()).try_init()
    } else {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
    };

    if result.is_ok() {
        tracing::info!(
            service = %config.service.name,
            environment = %config.service.environment,
            "Tracing initialized"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice_does_not_panic() {
        let config = Config::default();
        init_tracing(&config);
        init_tracing(&config);
    }

    #[test]
    fn test_invalid_level_falls_back_to_info() {
        let mut config = Config::default();
        config.service.log_level = "cms_service=loud".into();
        assert_eq!(env_filter(&config).to_string(), "info");
    }
}
