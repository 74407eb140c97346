//! Extension and per-invocation contexts
//!
//! [`ExtensionContext`] is built once by the host and shared read-only by
//! every handler registered through one dispatcher. Each invocation gets a
//! fresh [`HookContext`] whose fields are layered as:
//!
//! 1. base fields from the extension context
//! 2. per-call fields supplied by the host at dispatch time
//! 3. `_payload`, the event's raw data
//!
//! Later layers win. The base context is never written to.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::logger::{HookLogger, TracingLogger};
use crate::services::{Accountability, SchemaProvider, ServiceRegistry, StaticSchema};
use crate::types::RawFields;

/// Field holding the raw event payload inside a [`HookContext`]
pub const PAYLOAD_FIELD: &str = "_payload";

/// Field holding the triggering data inside an operation's data map
pub const TRIGGER_FIELD: &str = "$trigger";

/// Opaque database handle passed through to services
pub type DatabaseHandle = Arc<dyn Any + Send + Sync>;

/// Long-lived context supplied by the host when the extension is loaded
pub struct ExtensionContext {
    name: String,
    logger: Arc<dyn HookLogger>,
    services: ServiceRegistry,
    schema: Arc<dyn SchemaProvider>,
    database: Option<DatabaseHandle>,
    fields: RawFields,
}

impl ExtensionContext {
    pub fn builder(name: impl Into<String>) -> ExtensionContextBuilder {
        ExtensionContextBuilder::new(name)
    }

    /// Extension name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn logger(&self) -> &Arc<dyn HookLogger> {
        &self.logger
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    pub fn schema_provider(&self) -> &Arc<dyn SchemaProvider> {
        &self.schema
    }

    pub fn database(&self) -> Option<&DatabaseHandle> {
        self.database.as_ref()
    }

    /// Data fields every invocation context starts from
    pub fn fields(&self) -> &RawFields {
        &self.fields
    }
}

impl fmt::Debug for ExtensionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionContext")
            .field("name", &self.name)
            .field("services", &self.services.names())
            .field("has_database", &self.database.is_some())
            .field("fields", &self.fields)
            .finish()
    }
}

/// Builder for [`ExtensionContext`]
pub struct ExtensionContextBuilder {
    name: String,
    logger: Option<Arc<dyn HookLogger>>,
    services: ServiceRegistry,
    schema: Option<Arc<dyn SchemaProvider>>,
    database: Option<DatabaseHandle>,
    fields: RawFields,
}

impl ExtensionContextBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            logger: None,
            services: ServiceRegistry::new(),
            schema: None,
            database: None,
            fields: RawFields::new(),
        }
    }

    pub fn logger(mut self, logger: Arc<dyn HookLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn services(mut self, services: ServiceRegistry) -> Self {
        self.services = services;
        self
    }

    pub fn schema(mut self, schema: Arc<dyn SchemaProvider>) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn database(mut self, database: DatabaseHandle) -> Self {
        self.database = Some(database);
        self
    }

    /// Add a base data field
    pub fn field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn build(self) -> ExtensionContext {
        let logger = self
            .logger
            .unwrap_or_else(|| Arc::new(TracingLogger::new(self.name.clone())));
        let schema = self
            .schema
            .unwrap_or_else(|| Arc::new(StaticSchema::default()));

        ExtensionContext {
            name: self.name,
            logger,
            services: self.services,
            schema,
            database: self.database,
            fields: self.fields,
        }
    }
}

/// Context handed to a single handler invocation
#[derive(Clone)]
pub struct HookContext {
    base: Arc<ExtensionContext>,
    fields: RawFields,
}

impl HookContext {
    /// Layer `call` fields and an optional payload over the base fields
    pub fn merged(base: Arc<ExtensionContext>, call: RawFields, payload: Option<Value>) -> Self {
        let mut fields = base.fields().clone();
        fields.extend(call);
        if let Some(payload) = payload {
            fields.insert(PAYLOAD_FIELD.to_string(), payload);
        }
        Self { base, fields }
    }

    /// Context carrying only the base fields
    pub fn base_only(base: Arc<ExtensionContext>) -> Self {
        Self::merged(base, RawFields::new(), None)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &RawFields {
        &self.fields
    }

    /// Raw event payload, absent for scheduled jobs
    pub fn payload(&self) -> Option<&Value> {
        self.fields.get(PAYLOAD_FIELD)
    }

    /// Acting identity supplied by the host for this call, if any
    pub fn accountability(&self) -> Option<Accountability> {
        self.fields
            .get("accountability")
            .filter(|v| !v.is_null())
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn logger(&self) -> &Arc<dyn HookLogger> {
        self.base.logger()
    }

    pub fn extension(&self) -> &ExtensionContext {
        &self.base
    }
}

impl fmt::Debug for HookContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookContext")
            .field("extension", &self.base.name())
            .field("fields", &self.fields)
            .finish()
    }
}

/// Context of an externally triggered operation (flow step)
#[derive(Clone)]
pub struct OperationContext {
    base: Arc<ExtensionContext>,
    name: String,
    data: RawFields,
    accountability: Option<Accountability>,
}

impl OperationContext {
    pub fn new(base: Arc<ExtensionContext>, name: impl Into<String>, data: RawFields) -> Self {
        Self {
            base,
            name: name.into(),
            data,
            accountability: None,
        }
    }

    pub fn with_accountability(mut self, accountability: Accountability) -> Self {
        self.accountability = Some(accountability);
        self
    }

    /// Operation name, used to tag synthesized accountability
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &RawFields {
        &self.data
    }

    /// The `$trigger` entry of the operation data
    pub fn trigger(&self) -> Option<&Value> {
        self.data.get(TRIGGER_FIELD)
    }

    pub fn accountability(&self) -> Option<&Accountability> {
        self.accountability.as_ref()
    }

    pub fn extension(&self) -> &ExtensionContext {
        &self.base
    }
}

impl fmt::Debug for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationContext")
            .field("extension", &self.base.name())
            .field("name", &self.name)
            .field("data", &self.data)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn base() -> Arc<ExtensionContext> {
        Arc::new(
            ExtensionContext::builder("test-ext")
                .field("env", json!("prod"))
                .field("region", json!("eu"))
                .build(),
        )
    }

    fn call(value: Value) -> RawFields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_call_fields_overlay_base() {
        let ctx = HookContext::merged(base(), call(json!({ "region": "us" })), None);
        assert_eq!(ctx.get("env"), Some(&json!("prod")));
        assert_eq!(ctx.get("region"), Some(&json!("us")));
        assert!(ctx.payload().is_none());
    }

    #[test]
    fn test_payload_overlays_everything() {
        let ctx = HookContext::merged(
            base(),
            call(json!({ "_payload": "from-call" })),
            Some(json!({ "title": "x" })),
        );
        assert_eq!(ctx.payload(), Some(&json!({ "title": "x" })));
    }

    #[test]
    fn test_base_is_not_mutated() {
        let base = base();
        let _ctx = HookContext::merged(base.clone(), call(json!({ "env": "dev" })), Some(json!(1)));
        assert_eq!(base.fields().get("env"), Some(&json!("prod")));
        assert!(base.fields().get(PAYLOAD_FIELD).is_none());
    }

    #[test]
    fn test_accountability_from_call() {
        let ctx = HookContext::merged(
            base(),
            call(json!({ "accountability": { "user": "u1", "role": "r1", "admin": false } })),
            None,
        );
        let accountability = ctx.accountability().unwrap();
        assert_eq!(accountability.user.as_deref(), Some("u1"));
        assert!(!accountability.admin);
    }

    #[test]
    fn test_operation_trigger() {
        let op = OperationContext::new(
            base(),
            "notify",
            call(json!({ "$trigger": { "payload": { "a": 1 }, "keys": ["1"] } })),
        );
        assert_eq!(op.trigger().unwrap()["keys"], json!(["1"]));
        assert_eq!(op.name(), "notify");
    }
}
