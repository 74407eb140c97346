//! Extension Hook Bridge
//!
//! Typed hook registration and payload validation for content-platform
//! extensions.
//!
//! # Overview
//!
//! Hosts expose three raw registration primitives: filters (synchronous
//! payload transforms), actions (fire-and-forget notifications) and schedules
//! (cron jobs). Their callbacks receive loosely shaped maps. This crate sits
//! between the host and extension code and gives handlers:
//!
//! - normalized [`Metadata`] (`event`, `collection`, `keys`)
//! - a [`HookContext`] merging the extension context with per-call fields
//! - payload readers validating against object schemas or ordered unions
//! - error isolation: every handler failure is logged once through the
//!   context logger, filters re-raise it, actions and schedules swallow it
//! - accountability-aware construction of host services
//!
//! # Architecture
//!
//! 1. **Dispatcher** (`dispatcher`): wraps a [`RawHookRegistrar`]
//! 2. **Payload** (`payload`): schemas, diagnostics and readers
//! 3. **Services** (`services`): service registry and factories
//! 4. **Host** (`host`): in-memory raw host for tests and tooling
//! 5. **Configuration** (`config`): YAML bridge configuration
//!
//! # Quick Start
//!
//! ```ignore
//! use extbridge_hooks::{
//!     read_hook_payload, ExtensionContext, FieldKind, HookDispatcher, InMemoryHookHost,
//!     ObjectShape, Schema,
//! };
//!
//! let host = Arc::new(InMemoryHookHost::new());
//! let context = Arc::new(ExtensionContext::builder("article-workflows").build());
//! let dispatcher = HookDispatcher::new(host.clone(), context)?;
//!
//! let schema: Schema = ObjectShape::new().field("title", FieldKind::String).into();
//! dispatcher.filter("items.create", move |_meta, ctx| {
//!     let schema = schema.clone();
//!     async move { read_hook_payload(&ctx, &schema) }
//! })?;
//! ```
//!
//! # Configuration
//!
//! `.extbridge/bridge.yaml`:
//!
//! ```yaml
//! extension: article-workflows
//! logging:
//!   filter: info
//! dispatch:
//!   catch_panics: true
//!   drain_timeout_ms: 5000
//! ```

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod isolation;
pub mod logger;
pub mod logging;
pub mod payload;
pub mod services;
pub mod types;

pub use config::{BridgeConfig, ConfigLoader, ConfigValidator, DispatchConfig, LoggingConfig};
pub use context::{
    DatabaseHandle, ExtensionContext, ExtensionContextBuilder, HookContext, OperationContext,
    PAYLOAD_FIELD, TRIGGER_FIELD,
};
pub use dispatcher::{
    HookDispatcher, RawActionHandler, RawFilterHandler, RawHookRegistrar, RawScheduleHandler,
};
pub use error::{FailedValidationError, HooksError, Result, ValidationError};
pub use host::{InMemoryHookHost, Registration};
pub use logger::{HookLogger, TracingLogger};
pub use logging::init_tracing;
pub use payload::{
    read, read_hook_payload, read_hook_payload_as, read_trigger_keys, read_trigger_payload,
    read_trigger_payload_as, Diagnostic, Field, FieldKind, Issue, JsonSchemaShape, ObjectSchema,
    ObjectShape, Schema, UnknownKeys,
};
pub use services::{
    create_files_service, create_folders_service, create_items_service,
    create_items_service_as, create_notifications_service, create_service, create_service_as,
    create_translations_service, Accountability, AccountabilityMode, AnyService,
    SchemaOverview, SchemaProvider, ServiceDescriptor, ServiceInit, ServiceOptions,
    ServiceRegistry, StaticSchema,
};
pub use types::{HookKind, Metadata, RawFields};
