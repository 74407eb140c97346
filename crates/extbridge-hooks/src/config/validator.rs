//! Configuration validation

use super::BridgeConfig;
use crate::error::{HooksError, Result};

/// Checks a [`BridgeConfig`] before it is used
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a bridge configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the extension name or log filter is empty, or the
    /// drain timeout is zero.
    pub fn validate(config: &BridgeConfig) -> Result<()> {
        if config.extension.trim().is_empty() {
            return Err(HooksError::InvalidConfiguration(
                "Extension name cannot be empty".to_string(),
            ));
        }

        if config.logging.filter.trim().is_empty() {
            return Err(HooksError::InvalidConfiguration(
                "Logging filter cannot be empty".to_string(),
            ));
        }

        if config.dispatch.drain_timeout_ms == 0 {
            return Err(HooksError::InvalidConfiguration(
                "Drain timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
