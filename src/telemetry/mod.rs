//! Logging setup
//!
//! One `tracing` subscriber per process: an `EnvFilter` built from the
//! configured directive (raised by `-v`), and a plain or JSON fmt layer
//! writing to stderr so command output on stdout stays machine-readable.

use crate::cli::args::Verbosity;
use crate::cli::config::LoggingConfig;
use crate::errors::{AppError, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Effective filter directive for the given verbosity
pub fn filter_directive(base: &str, verbosity: Verbosity) -> String {
    match verbosity {
        Verbosity::Quiet => "warn".to_string(),
        Verbosity::Normal => base.to_string(),
        Verbosity::Verbose => format!("{},marcacheck=debug", base),
        Verbosity::VeryVerbose => "debug,marcacheck=trace".to_string(),
    }
}

/// Install the global subscriber
pub fn init_tracing(config: &LoggingConfig, verbosity: Verbosity, json: bool) -> Result<()> {
    let directive = filter_directive(&config.filter, verbosity);
    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| AppError::ConfigError(format!("Invalid log filter '{}': {}", directive, e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json || config.json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    installed.map_err(|e| AppError::ConfigError(format!("Logging already initialized: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("info", Verbosity::Normal), "info");
        assert_eq!(filter_directive("info", Verbosity::Verbose), "info,marcacheck=debug");
        assert_eq!(filter_directive("info", Verbosity::Quiet), "warn");
        assert!(filter_directive("info", Verbosity::VeryVerbose).contains("trace"));
    }

    #[test]
    fn test_directives_parse() {
        for verbosity in [Verbosity::Quiet, Verbosity::Normal, Verbosity::Verbose, Verbosity::VeryVerbose] {
            let directive = filter_directive("info,tower_http=warn", verbosity);
            assert!(EnvFilter::try_new(&directive).is_ok(), "{}", directive);
        }
    }
}
