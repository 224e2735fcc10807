//! Logging infrastructure.
//!
//! Diagnostics go to standard error through a `tracing` subscriber so
//! that reports printed on standard output stay clean:
//! - Filter from the `RUST_LOG` environment variable
//! - Defaults to `warn`, or `debug` when verbose

use std::io;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Error returned when a global subscriber is already installed.
#[derive(Debug, thiserror::Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct LoggingError(String);

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Build the filter used by [`init_logging`].
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Initialize the global subscriber.
///
/// # Errors
///
/// Returns an error if another subscriber was installed first.
pub fn init_logging(verbose: bool) -> Result<(), LoggingError> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(stderr_layer)
        .try_init()
        .map_err(|e| LoggingError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "warn");
        assert_eq!(default_directive(true), "debug");
    }

    #[test]
    fn test_second_init_fails() {
        // The first call may also fail if another test installed one.
        let _ = init_logging(false);
        assert!(init_logging(false).is_err());
    }
}
