//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events. Hosts that do not install their
//! own subscriber can call [`init_tracing`] once at startup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{HooksError, Result};

/// Install a global `fmt` subscriber
///
/// `RUST_LOG` overrides `config.filter` when set. Returns `Ok(false)` when a
/// global subscriber is already installed.
///
/// # Errors
///
/// Returns an error if the configured filter directive does not parse.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(&config.filter)?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    Ok(installed)
}

fn build_filter(directive: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| {
        HooksError::InvalidConfiguration(format!("Invalid log filter '{}': {}", directive, e))
    })
}
