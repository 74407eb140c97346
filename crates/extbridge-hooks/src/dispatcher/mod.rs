//! Raw host registration API and its normalized wrapper
//!
//! Hosts expose three registration primitives with different callback
//! shapes:
//!
//! | kind       | raw callback                         | result            |
//! |------------|--------------------------------------|-------------------|
//! | `filter`   | `(payload, meta, context) -> future` | transformed value |
//! | `action`   | `(meta, context)`                    | none, returns now |
//! | `schedule` | `()`                                 | none, returns now |
//!
//! [`HookDispatcher`] hides those shapes: handlers always receive normalized
//! [`Metadata`](crate::types::Metadata) and a merged
//! [`HookContext`](crate::context::HookContext), and every invocation goes
//! through the shared isolation helper.

pub mod normalizer;

pub use normalizer::HookDispatcher;

use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::Result;
use crate::types::RawFields;

/// Raw filter callback: `(payload, meta, context)` resolving to the new payload
pub type RawFilterHandler =
    Arc<dyn Fn(Value, RawFields, RawFields) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Raw action callback: `(meta, context)`; must return without blocking
pub type RawActionHandler = Arc<dyn Fn(RawFields, RawFields) + Send + Sync>;

/// Raw schedule callback; must return without blocking
pub type RawScheduleHandler = Arc<dyn Fn() + Send + Sync>;

/// Registration primitives supplied by the host framework
///
/// Each method returns a registration id assigned by the host. Cron
/// expressions are opaque to this crate.
pub trait RawHookRegistrar: Send + Sync {
    fn filter(&self, event: &str, handler: RawFilterHandler) -> Result<String>;

    fn action(&self, event: &str, handler: RawActionHandler) -> Result<String>;

    fn schedule(&self, cron: &str, handler: RawScheduleHandler) -> Result<String>;
}
