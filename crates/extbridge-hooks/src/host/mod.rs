//! In-memory reference host
//!
//! [`InMemoryHookHost`] implements the raw registration primitives the way an
//! embedding framework would: it stores raw callbacks and lets the caller fire
//! them. It is what tests and local tooling run handlers against.
//!
//! It is not a scheduler. Cron expressions are stored verbatim and only fire
//! when [`InMemoryHookHost::trigger_schedule`] is called with the same string.
//!
//! # Examples
//!
//! ```ignore
//! let host = Arc::new(InMemoryHookHost::new());
//! let dispatcher = HookDispatcher::new(host.clone(), Arc::new(context))?;
//! dispatcher.filter("items.create", handler)?;
//!
//! let payload = host
//!     .emit_filter("items.create", json!({ "title": "Hello" }), meta, RawFields::new())
//!     .await?;
//! ```

pub mod storage;

pub use storage::InMemoryHookHost;

use serde::{Deserialize, Serialize};

use crate::types::HookKind;

/// A raw callback known to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Unique registration id
    pub id: String,

    pub kind: HookKind,

    /// Event name for filters and actions, cron expression for schedules
    pub target: String,
}
