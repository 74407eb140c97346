//! In-memory raw hook storage

use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use super::Registration;
use crate::dispatcher::{RawActionHandler, RawFilterHandler, RawHookRegistrar, RawScheduleHandler};
use crate::error::{HooksError, Result};
use crate::types::{HookKind, RawFields};

#[derive(Clone)]
enum RawHandler {
    Filter(RawFilterHandler),
    Action(RawActionHandler),
    Schedule(RawScheduleHandler),
}

struct Entry {
    registration: Registration,
    handler: RawHandler,
}

/// In-memory host keeping raw callbacks in registration order
#[derive(Clone)]
pub struct InMemoryHookHost {
    entries: Arc<RwLock<Vec<Entry>>>,
}

impl InMemoryHookHost {
    /// Create an empty host
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    fn insert(&self, kind: HookKind, target: &str, handler: RawHandler) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let mut entries = self.entries.write().map_err(|e| {
            HooksError::Registration(format!("Failed to acquire write lock: {}", e))
        })?;

        entries.push(Entry {
            registration: Registration {
                id: id.clone(),
                kind,
                target: target.to_string(),
            },
            handler,
        });
        debug!(kind = %kind, target = target, registration = %id, "Stored raw hook");
        Ok(id)
    }

    /// Handlers of `kind` registered for `target`, in registration order
    fn matching(&self, kind: HookKind, target: &str) -> Result<Vec<RawHandler>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| HooksError::Registration(format!("Failed to acquire read lock: {}", e)))?;

        Ok(entries
            .iter()
            .filter(|entry| entry.registration.kind == kind && entry.registration.target == target)
            .map(|entry| entry.handler.clone())
            .collect())
    }

    /// Remove a registration
    ///
    /// # Errors
    ///
    /// Returns an error if no registration has this id.
    pub fn unregister(&self, id: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|e| {
            HooksError::Registration(format!("Failed to acquire write lock: {}", e))
        })?;

        let position = entries
            .iter()
            .position(|entry| entry.registration.id == id)
            .ok_or_else(|| HooksError::RegistrationNotFound(id.to_string()))?;
        entries.remove(position);
        Ok(())
    }

    /// All registrations, in registration order
    pub fn list_registrations(&self) -> Result<Vec<Registration>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| HooksError::Registration(format!("Failed to acquire read lock: {}", e)))?;

        Ok(entries.iter().map(|entry| entry.registration.clone()).collect())
    }

    /// Registrations of `kind` for `target`
    pub fn registrations_for(&self, kind: HookKind, target: &str) -> Result<Vec<Registration>> {
        Ok(self
            .list_registrations()?
            .into_iter()
            .filter(|registration| registration.kind == kind && registration.target == target)
            .collect())
    }

    /// Run the filter chain for `event`
    ///
    /// Each filter receives the previous filter's output. The first failure
    /// stops the chain and is returned.
    pub async fn emit_filter(
        &self,
        event: &str,
        payload: Value,
        meta: RawFields,
        context: RawFields,
    ) -> Result<Value> {
        let handlers = self.matching(HookKind::Filter, event)?;
        debug!(event = event, count = handlers.len(), "Emitting filter");

        let mut payload = payload;
        for handler in handlers {
            if let RawHandler::Filter(filter) = handler {
                payload = filter(payload, meta.clone(), context.clone()).await?;
            }
        }
        Ok(payload)
    }

    /// Notify every action registered for `event`; returns how many fired
    pub fn emit_action(&self, event: &str, meta: RawFields, context: RawFields) -> Result<usize> {
        let handlers = self.matching(HookKind::Action, event)?;
        let mut fired = 0;
        for handler in handlers {
            if let RawHandler::Action(action) = handler {
                action(meta.clone(), context.clone());
                fired += 1;
            }
        }
        debug!(event = event, fired = fired, "Emitted action");
        Ok(fired)
    }

    /// Fire every schedule registered with exactly `cron`
    pub fn trigger_schedule(&self, cron: &str) -> Result<usize> {
        let handlers = self.matching(HookKind::Schedule, cron)?;
        let mut fired = 0;
        for handler in handlers {
            if let RawHandler::Schedule(schedule) = handler {
                schedule();
                fired += 1;
            }
        }
        info!(cron = cron, fired = fired, "Triggered schedule");
        Ok(fired)
    }
}

impl Default for InMemoryHookHost {
    fn default() -> Self {
        Self::new()
    }
}

impl RawHookRegistrar for InMemoryHookHost {
    fn filter(&self, event: &str, handler: RawFilterHandler) -> Result<String> {
        self.insert(HookKind::Filter, event, RawHandler::Filter(handler))
    }

    fn action(&self, event: &str, handler: RawActionHandler) -> Result<String> {
        self.insert(HookKind::Action, event, RawHandler::Action(handler))
    }

    fn schedule(&self, cron: &str, handler: RawScheduleHandler) -> Result<String> {
        self.insert(HookKind::Schedule, cron, RawHandler::Schedule(handler))
    }
}
