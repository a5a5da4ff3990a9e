//! Tracing subscriber setup.

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{ProxyError, Result};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` if set, else the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Install the global subscriber, writing to stderr.
///
/// # Errors
///
/// Returns [`ProxyError::Config`] if a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(config));

    let installed = match config.format {
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
        LogFormat::Text => builder.try_init(),
    };
    installed.map_err(|e| ProxyError::Config(format!("failed to install log subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_level_falls_back() {
        let config = LoggingConfig {
            level: "not a [valid directive".into(),
            ..Default::default()
        };
        // Must not panic whatever RUST_LOG holds.
        let _ = env_filter(&config);
    }

    #[test]
    fn second_init_is_an_error() {
        let config = LoggingConfig {
            format: LogFormat::Text,
            ..Default::default()
        };
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
