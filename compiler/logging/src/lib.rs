#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Logging setup for the generator.
//!
//! Library crates log through `tracing`. Binaries call [`init`] once. Logs go
//! to stderr because stdout carries the plugin response.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The level string is not a valid filter directive.
    #[error("invalid log level {0:?}: {1}")]
    InvalidLevel(String, String),
    /// A global subscriber is already installed.
    #[error("logging already initialised: {0}")]
    AlreadyInitialised(String),
}

/// Build the filter: `RUST_LOG` wins over `level` when set.
pub fn filter_for(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level)
        .map_err(|e| LoggingError::InvalidLevel(level.to_string(), e.to_string()))
}

/// Install a stderr subscriber at `level`.
pub fn init(level: &str) -> Result<(), LoggingError> {
    let filter = filter_for(level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialised(e.to_string()))
}

/// Emits a trace event tagged with `module`.
pub fn trace(module: &str, msg: &str) {
    tracing::trace!(module = module, "{}", msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_for_rejects_garbage() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        assert!(filter_for("info").is_ok());
        assert!(filter_for("protoc=debug").is_ok());
        match filter_for("generator=loud") {
            Err(LoggingError::InvalidLevel(level, _)) => assert_eq!(level, "generator=loud"),
            other => panic!("Expected InvalidLevel, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init("warn");
        assert!(matches!(init("warn"), Err(LoggingError::AlreadyInitialised(_))));
    }
}
