//! Normalized registration surface over a raw host

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use tracing::debug;

use super::{RawActionHandler, RawFilterHandler, RawHookRegistrar, RawScheduleHandler};
use crate::config::DispatchConfig;
use crate::context::{ExtensionContext, HookContext};
use crate::error::{HooksError, Result};
use crate::isolation::run_isolated;
use crate::types::{HookKind, Metadata, RawFields};

/// Registers handlers on a raw host with normalized arguments and isolation
///
/// Filters run inline and report failures to the host. Actions and schedules
/// run on detached tasks spawned on the captured runtime; their failures are
/// only visible through the context logger.
///
/// # Examples
///
/// ```ignore
/// let dispatcher = HookDispatcher::new(host.clone(), Arc::new(context))?;
///
/// dispatcher.filter("items.create", |meta, ctx| async move {
///     let mut payload = read_hook_payload(&ctx, &article_schema)?;
///     payload["slug"] = json!(slugify(payload["title"].as_str().unwrap_or_default()));
///     Ok(payload)
/// })?;
///
/// dispatcher.action("items.update", |meta, _ctx| async move {
///     info!(keys = ?meta.keys, "Articles updated");
///     Ok(())
/// })?;
/// ```
#[derive(Clone)]
pub struct HookDispatcher {
    raw: Arc<dyn RawHookRegistrar>,
    base: Arc<ExtensionContext>,
    runtime: Handle,
    tasks: TaskTracker,
    /// Concurrent `drain` calls; the last one to finish reopens the tracker
    draining: Arc<Mutex<usize>>,
    catch_panics: bool,
}

impl HookDispatcher {
    /// Dispatcher bound to the current tokio runtime
    ///
    /// # Errors
    ///
    /// Returns an error when called outside a tokio runtime.
    pub fn new(raw: Arc<dyn RawHookRegistrar>, base: Arc<ExtensionContext>) -> Result<Self> {
        let runtime =
            Handle::try_current().map_err(|e| HooksError::RuntimeUnavailable(e.to_string()))?;
        Ok(Self::with_runtime(raw, base, runtime))
    }

    /// Dispatcher spawning detached handlers on `runtime`
    pub fn with_runtime(
        raw: Arc<dyn RawHookRegistrar>,
        base: Arc<ExtensionContext>,
        runtime: Handle,
    ) -> Self {
        Self {
            raw,
            base,
            runtime,
            tasks: TaskTracker::new(),
            draining: Arc::new(Mutex::new(0)),
            catch_panics: true,
        }
    }

    pub fn with_config(mut self, config: &DispatchConfig) -> Self {
        self.catch_panics = config.catch_panics;
        self
    }

    /// Whether handler panics are converted into logged errors
    pub fn catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }

    pub fn context(&self) -> &Arc<ExtensionContext> {
        &self.base
    }

    /// Register a filter handler
    ///
    /// The handler's value replaces the payload in the host's filter chain.
    /// A failing handler is logged and its error is returned to the host.
    pub fn filter<F, Fut>(&self, event: &str, handler: F) -> Result<String>
    where
        F: Fn(Metadata, HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let base = self.base.clone();
        let handler = Arc::new(handler);
        let name = event.to_string();
        let catch_panics = self.catch_panics;

        let raw: RawFilterHandler =
            Arc::new(move |payload: Value, raw_meta: RawFields, raw_context: RawFields| {
                let meta = Metadata::for_filter(raw_meta);
                let ctx = HookContext::merged(base.clone(), raw_context, Some(payload));
                let base = base.clone();
                let handler = handler.clone();
                let name = name.clone();

                async move {
                    run_isolated(
                        base.logger().as_ref(),
                        HookKind::Filter,
                        &name,
                        catch_panics,
                        async move { handler(meta, ctx).await },
                    )
                    .await
                }
                .boxed()
            });

        let id = self.raw.filter(event, raw)?;
        debug!(event = event, registration = %id, "Registered filter");
        Ok(id)
    }

    /// Register an action handler
    ///
    /// The raw callback returns immediately; the handler runs on a detached
    /// task. `keys` collects both the raw `keys` list and a singular `key`,
    /// and the context payload is the raw metadata's `payload` field.
    pub fn action<F, Fut>(&self, event: &str, handler: F) -> Result<String>
    where
        F: Fn(Metadata, HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let base = self.base.clone();
        let handler = Arc::new(handler);
        let name = event.to_string();
        let catch_panics = self.catch_panics;
        let runtime = self.runtime.clone();
        let tasks = self.tasks.clone();

        let raw: RawActionHandler = Arc::new(move |raw_meta: RawFields, raw_context: RawFields| {
            let payload = raw_meta.get("payload").cloned().unwrap_or(Value::Null);
            let meta = Metadata::for_action(raw_meta);
            let ctx = HookContext::merged(base.clone(), raw_context, Some(payload));
            let base = base.clone();
            let handler = handler.clone();
            let name = name.clone();

            // Detached: the handle is dropped and nobody observes the result.
            tasks.spawn_on(
                async move {
                    run_isolated(
                        base.logger().as_ref(),
                        HookKind::Action,
                        &name,
                        catch_panics,
                        async move { handler(meta, ctx).await },
                    )
                    .await
                },
                &runtime,
            );
        });

        let id = self.raw.action(event, raw)?;
        debug!(event = event, registration = %id, "Registered action");
        Ok(id)
    }

    /// Register a scheduled job
    ///
    /// `cron` is passed to the host untouched. The handler receives a context
    /// built from the base fields only.
    pub fn schedule<F, Fut>(&self, cron: &str, handler: F) -> Result<String>
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let base = self.base.clone();
        let handler = Arc::new(handler);
        let name = cron.to_string();
        let catch_panics = self.catch_panics;
        let runtime = self.runtime.clone();
        let tasks = self.tasks.clone();

        let raw: RawScheduleHandler = Arc::new(move || {
            let ctx = HookContext::base_only(base.clone());
            let base = base.clone();
            let handler = handler.clone();
            let name = name.clone();

            tasks.spawn_on(
                async move {
                    run_isolated(
                        base.logger().as_ref(),
                        HookKind::Schedule,
                        &name,
                        catch_panics,
                        async move { handler(ctx).await },
                    )
                    .await
                },
                &runtime,
            );
        });

        let id = self.raw.schedule(cron, raw)?;
        debug!(cron = cron, registration = %id, "Registered schedule");
        Ok(id)
    }

    /// Number of detached action and schedule tasks still running
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Wait up to `timeout` for detached tasks to finish
    ///
    /// Returns `true` when every task completed in time. Tasks spawned after
    /// draining started are still tracked. Overlapping calls, from this
    /// dispatcher or its clones, keep the tracker closed until the last one
    /// returns. The outcome is reported through the context logger.
    pub async fn drain(&self, timeout: Duration) -> bool {
        {
            let mut draining = self.draining.lock().unwrap_or_else(PoisonError::into_inner);
            *draining += 1;
            self.tasks.close();
        }
        let pending = self.tasks.len();
        let finished = tokio::time::timeout(timeout, self.tasks.wait())
            .await
            .is_ok();
        {
            let mut draining = self.draining.lock().unwrap_or_else(PoisonError::into_inner);
            *draining -= 1;
            if *draining == 0 {
                self.tasks.reopen();
            }
        }

        let logger = self.base.logger();
        if finished {
            logger.info(&format!("Detached hook tasks finished ({} drained)", pending));
        } else {
            logger.warn(&format!(
                "{} detached hook tasks still running after {}ms drain timeout",
                self.tasks.len(),
                saturating_millis(timeout)
            ));
        }
        finished
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
