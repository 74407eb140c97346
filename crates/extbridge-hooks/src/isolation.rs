//! Error isolation shared by every registration kind
//!
//! A handler failure is reported to the context logger exactly once and then
//! handed back to the caller unchanged. What the caller does with it depends
//! on the registration kind: filters return it to the host, detached actions
//! and schedules drop it.
//!
//! Panics are always caught long enough to be logged. With `catch_panics`
//! off, the panic is resumed after logging instead of being turned into an
//! error.

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use tracing::debug;

use crate::error::{HooksError, Result};
use crate::logger::HookLogger;
use crate::types::HookKind;

/// Run a handler future, logging its failure (or panic) before returning it
///
/// When `catch_panics` is `false` a panicking handler is logged and the panic
/// then continues to unwind.
pub async fn run_isolated<T, Fut>(
    logger: &dyn HookLogger,
    kind: HookKind,
    name: &str,
    catch_panics: bool,
    handler: Fut,
) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    let outcome = match AssertUnwindSafe(handler).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            let err = HooksError::HandlerPanicked {
                kind: kind.as_str(),
                name: name.to_string(),
                message: panic_message(payload.as_ref()),
            };
            if !catch_panics {
                logger.error(&err);
                panic::resume_unwind(payload);
            }
            Err(err)
        }
    };

    match &outcome {
        Ok(_) => debug!(kind = %kind, name = name, "Hook handler completed"),
        Err(e) => logger.error(e),
    }

    outcome
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingLogger {
        errors: Mutex<Vec<String>>,
    }

    impl HookLogger for RecordingLogger {
        fn error(&self, err: &HooksError) {
            self.errors.lock().unwrap().push(err.to_string());
        }
    }

    #[tokio::test]
    async fn test_success_is_not_logged() {
        let logger = RecordingLogger::default();
        let value = run_isolated(&logger, HookKind::Filter, "items.create", true, async {
            Ok::<_, HooksError>(5)
        })
        .await
        .unwrap();

        assert_eq!(value, 5);
        assert!(logger.errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failure_logged_once_and_returned() {
        let logger = RecordingLogger::default();
        let result: Result<()> = run_isolated(&logger, HookKind::Action, "items.update", true, async {
            Err(HooksError::handler("boom"))
        })
        .await;

        assert!(matches!(result, Err(HooksError::ExecutionFailed(ref m)) if m == "boom"));
        assert_eq!(logger.errors.lock().unwrap().len(), 1);
    }

    fn explode() -> Result<()> {
        panic!("handler exploded")
    }

    #[tokio::test]
    async fn test_panic_becomes_error() {
        let logger = RecordingLogger::default();
        let result: Result<()> =
            run_isolated(&logger, HookKind::Schedule, "*/5 * * * *", true, async { explode() })
                .await;

        match result {
            Err(HooksError::HandlerPanicked { kind, name, message }) => {
                assert_eq!(kind, "schedule");
                assert_eq!(name, "*/5 * * * *");
                assert_eq!(message, "handler exploded");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(logger.errors.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_uncaught_panic_is_logged_then_resumed() {
        let logger = RecordingLogger::default();
        let unwound = AssertUnwindSafe(run_isolated(
            &logger,
            HookKind::Action,
            "items.delete",
            false,
            async { explode() },
        ))
        .catch_unwind()
        .await;

        assert!(unwound.is_err());
        let errors = logger.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("handler exploded"));
    }
}
