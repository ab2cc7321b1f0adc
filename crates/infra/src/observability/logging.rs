//! Tracing subscriber setup
//!
//! `RUST_LOG` takes precedence over the configured level. Output goes to
//! stderr so stdout stays free for piped input/output.

use chatcal_domain::{ChatCalError, LoggingConfig, Result};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Returns an error if the configured directive is invalid. A subscriber
/// that is already installed (tests, embedding applications) is left in
/// place.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;

    let installed = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed, keeping existing one");
    }
    Ok(())
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| {
        ChatCalError::Config(format!("invalid log level '{}': {e}", config.level))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_directive() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig { level: "chatcal=verbose".to_string(), json: false };
        assert!(matches!(build_filter(&config), Err(ChatCalError::Config(_))));
    }

    #[test]
    fn init_is_idempotent() {
        let config = LoggingConfig::default();
        assert!(init_tracing(&config).is_ok());
        assert!(init_tracing(&config).is_ok());
    }
}
