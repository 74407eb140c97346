//! Named service constructors
//!
//! The host exposes its service classes by name. Crates can also contribute
//! constructors at link time with `inventory::submit!`:
//!
//! ```rust,ignore
//! inventory::submit! {
//!     ServiceDescriptor::new("AuditService", create_audit_service)
//! }
//! ```
//!
//! [`ServiceRegistry::with_discovered`] collects every submitted descriptor.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::accountability::Accountability;
use super::schema::SchemaOverview;
use crate::context::DatabaseHandle;
use crate::error::{HooksError, Result};

/// Type-erased service instance
pub type AnyService = Arc<dyn Any + Send + Sync>;

/// Constructor stored in the registry
pub type ServiceConstructor = Arc<dyn Fn(ServiceInit) -> Result<AnyService> + Send + Sync>;

/// Options every service is constructed with
#[derive(Clone)]
pub struct ServiceOptions {
    pub schema: SchemaOverview,
    pub database: Option<DatabaseHandle>,
    pub accountability: Option<Accountability>,
}

impl fmt::Debug for ServiceOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceOptions")
            .field("schema", &self.schema)
            .field("has_database", &self.database.is_some())
            .field("accountability", &self.accountability)
            .finish()
    }
}

/// Arguments handed to a service constructor
#[derive(Debug, Clone)]
pub struct ServiceInit {
    /// Target collection for collection-scoped services (items)
    pub collection: Option<String>,
    pub options: ServiceOptions,
}

/// Link-time service registration
pub struct ServiceDescriptor {
    pub name: &'static str,
    pub constructor: fn(ServiceInit) -> Result<AnyService>,
}

impl ServiceDescriptor {
    pub const fn new(name: &'static str, constructor: fn(ServiceInit) -> Result<AnyService>) -> Self {
        Self { name, constructor }
    }
}

inventory::collect!(ServiceDescriptor);

/// Names of all services submitted via `inventory`
pub fn list_discovered_services() -> Vec<&'static str> {
    inventory::iter::<ServiceDescriptor>()
        .map(|descriptor| descriptor.name)
        .collect()
}

/// Service classes available to extensions, keyed by name
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    constructors: HashMap<String, ServiceConstructor>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with every discovered [`ServiceDescriptor`]
    pub fn with_discovered() -> Self {
        let mut registry = Self::new();
        for descriptor in inventory::iter::<ServiceDescriptor>() {
            if registry.contains(descriptor.name) {
                warn!(service = descriptor.name, "Duplicate service descriptor ignored");
                continue;
            }
            let constructor = descriptor.constructor;
            registry
                .constructors
                .insert(descriptor.name.to_string(), Arc::new(constructor));
        }
        info!(count = registry.constructors.len(), "Discovered services via inventory");
        registry
    }

    /// Register a constructor under `name`
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is already registered.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F) -> Result<()>
    where
        F: Fn(ServiceInit) -> Result<AnyService> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.contains(&name) {
            return Err(HooksError::Registration(format!(
                "service '{}' already registered",
                name
            )));
        }
        debug!(service = %name, "Registering service constructor");
        self.constructors.insert(name, Arc::new(constructor));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.constructors.keys().cloned().collect();
        names.sort();
        names
    }

    /// Instantiate the service registered under `name`
    pub fn construct(&self, name: &str, init: ServiceInit) -> Result<AnyService> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| HooksError::ServiceNotRegistered(name.to_string()))?;
        constructor(init)
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AuditService;

    fn create_audit_service(_init: ServiceInit) -> Result<AnyService> {
        Ok(Arc::new(AuditService))
    }

    inventory::submit! {
        ServiceDescriptor::new("TestAuditService", create_audit_service)
    }

    fn init() -> ServiceInit {
        ServiceInit {
            collection: None,
            options: ServiceOptions {
                schema: SchemaOverview::default(),
                database: None,
                accountability: None,
            },
        }
    }

    #[test]
    fn test_discovered_services_include_test_descriptor() {
        assert!(list_discovered_services().contains(&"TestAuditService"));
        let registry = ServiceRegistry::with_discovered();
        assert!(registry.contains("TestAuditService"));
    }

    #[test]
    fn test_register_and_construct() {
        let mut registry = ServiceRegistry::new();
        registry
            .register("AuditService", |_init| Ok(Arc::new(AuditService) as AnyService))
            .unwrap();

        let service = registry.construct("AuditService", init()).unwrap();
        assert!(service.downcast::<AuditService>().is_ok());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ServiceRegistry::new();
        registry.register("A", create_audit_service).unwrap();
        assert!(registry.register("A", create_audit_service).is_err());
    }

    #[test]
    fn test_missing_service() {
        let registry = ServiceRegistry::new();
        let result = registry.construct("Nope", init());
        assert!(matches!(result, Err(HooksError::ServiceNotRegistered(_))));
    }
}
