//! Logging setup for the CLI.
//!
//! Diagnostics go to stderr so stdout stays clean for exported documents and
//! JSON output.

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install logger: {0}")]
    Install(String),
}

/// Default filter directive for the given verbosity flags.
#[must_use]
pub const fn default_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

fn build_env_filter(verbose: u8, quiet: bool) -> Result<EnvFilter, LoggingError> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(directives).map_err(|e| LoggingError::Filter(e.to_string()))
        }
        _ => Ok(EnvFilter::new(default_level(verbose, quiet))),
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the verbosity flags when it is set.
///
/// # Errors
///
/// Returns an error if `RUST_LOG` cannot be parsed or a subscriber is
/// already installed.
pub fn init_logging(verbose: u8, quiet: bool, json: bool) -> Result<(), LoggingError> {
    let filter = build_env_filter(verbose, quiet)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|e| LoggingError::Install(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(default_level(2, true), "error");
    }

    #[test]
    fn verbosity_steps() {
        assert_eq!(default_level(0, false), "warn");
        assert_eq!(default_level(1, false), "debug");
        assert_eq!(default_level(5, false), "trace");
    }
}
