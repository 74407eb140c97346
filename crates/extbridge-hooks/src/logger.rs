//! Context-owned logger
//!
//! Every failed handler invocation is reported once through the logger held
//! by the extension context. Hosts plug in their own sink; the default
//! forwards to `tracing`.

use tracing::{error, info, warn};

use crate::error::HooksError;

/// Sink for handler failures and diagnostics
pub trait HookLogger: Send + Sync {
    /// Report a failed handler invocation
    fn error(&self, err: &HooksError);

    /// Report a dispatcher condition worth attention, such as a drain timeout
    fn warn(&self, _message: &str) {}

    /// Report routine dispatcher progress, such as a completed drain
    fn info(&self, _message: &str) {}
}

/// Logger that forwards to `tracing`
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    extension: String,
}

impl TracingLogger {
    /// Logger whose records carry the extension name
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

impl HookLogger for TracingLogger {
    fn error(&self, err: &HooksError) {
        error!(
            extension = %self.extension,
            status = err.status(),
            error = %err,
            "Hook handler failed"
        );
    }

    fn warn(&self, message: &str) {
        warn!(extension = %self.extension, "{}", message);
    }

    fn info(&self, message: &str) {
        info!(extension = %self.extension, "{}", message);
    }
}
