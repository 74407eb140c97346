//! Bridge configuration
//!
//! Configuration is read from YAML. Sources are checked in order:
//! an explicit path, then `.extbridge/bridge.yaml` in the working directory,
//! then built-in defaults. A missing file is not an error.
//!
//! ```yaml
//! extension: article-workflows
//! logging:
//!   filter: "extbridge_hooks=debug,info"
//!   json: false
//! dispatch:
//!   catch_panics: true
//!   drain_timeout_ms: 5000
//! ```

pub mod loader;
pub mod validator;

pub use loader::ConfigLoader;
pub use validator::ConfigValidator;

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Extension name used in log records
    pub extension: String,

    pub logging: LoggingConfig,

    pub dispatch: DispatchConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            extension: "extension".to_string(),
            logging: LoggingConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set
    pub filter: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Hook dispatch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Convert handler panics into logged failures
    pub catch_panics: bool,

    /// Upper bound for waiting on detached handlers at shutdown
    pub drain_timeout_ms: u64,
}

impl DispatchConfig {
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            catch_panics: true,
            drain_timeout_ms: 5000,
        }
    }
}
