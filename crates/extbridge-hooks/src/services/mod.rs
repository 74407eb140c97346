//! Host service construction
//!
//! Thin helpers that look a service class up in the extension context's
//! [`ServiceRegistry`] and instantiate it with the current schema snapshot,
//! the database handle and the requested accountability.
//!
//! # Examples
//!
//! ```ignore
//! let items = create_items_service_as::<ItemsService>(
//!     ctx.extension(),
//!     "articles",
//!     AccountabilityMode::Operation(op.name().to_string()),
//! )
//! .await?;
//! ```

pub mod accountability;
pub mod registry;
pub mod schema;

use std::any::Any;
use std::sync::Arc;

use tracing::debug;

pub use accountability::{Accountability, AccountabilityMode};
pub use registry::{
    list_discovered_services, AnyService, ServiceConstructor, ServiceDescriptor, ServiceInit,
    ServiceOptions, ServiceRegistry,
};
pub use schema::{SchemaOverview, SchemaProvider, StaticSchema};

use crate::context::ExtensionContext;
use crate::error::{HooksError, Result};

pub const ITEMS_SERVICE: &str = "ItemsService";
pub const FILES_SERVICE: &str = "FilesService";
pub const FOLDERS_SERVICE: &str = "FoldersService";
pub const TRANSLATIONS_SERVICE: &str = "TranslationsService";
pub const NOTIFICATIONS_SERVICE: &str = "NotificationsService";

/// Instantiate the service registered under `name`
pub async fn create_service(
    ctx: &ExtensionContext,
    name: &str,
    collection: Option<&str>,
    accountability: AccountabilityMode,
) -> Result<AnyService> {
    if !ctx.services().contains(name) {
        return Err(HooksError::ServiceNotRegistered(name.to_string()));
    }

    let schema = ctx.schema_provider().get_schema().await?;
    let accountability = accountability.resolve();

    debug!(
        service = name,
        collection = collection.unwrap_or(""),
        system = accountability.is_none(),
        "Creating service"
    );

    ctx.services().construct(
        name,
        ServiceInit {
            collection: collection.map(str::to_string),
            options: ServiceOptions {
                schema,
                database: ctx.database().cloned(),
                accountability,
            },
        },
    )
}

/// Like [`create_service`], downcast to the concrete service type
pub async fn create_service_as<T: Any + Send + Sync>(
    ctx: &ExtensionContext,
    name: &str,
    collection: Option<&str>,
    accountability: AccountabilityMode,
) -> Result<Arc<T>> {
    create_service(ctx, name, collection, accountability)
        .await?
        .downcast::<T>()
        .map_err(|_| HooksError::ServiceTypeMismatch {
            name: name.to_string(),
            expected: std::any::type_name::<T>(),
        })
}

pub async fn create_items_service(
    ctx: &ExtensionContext,
    collection: &str,
    accountability: AccountabilityMode,
) -> Result<AnyService> {
    create_service(ctx, ITEMS_SERVICE, Some(collection), accountability).await
}

pub async fn create_items_service_as<T: Any + Send + Sync>(
    ctx: &ExtensionContext,
    collection: &str,
    accountability: AccountabilityMode,
) -> Result<Arc<T>> {
    create_service_as(ctx, ITEMS_SERVICE, Some(collection), accountability).await
}

pub async fn create_files_service(
    ctx: &ExtensionContext,
    accountability: AccountabilityMode,
) -> Result<AnyService> {
    create_service(ctx, FILES_SERVICE, None, accountability).await
}

pub async fn create_folders_service(
    ctx: &ExtensionContext,
    accountability: AccountabilityMode,
) -> Result<AnyService> {
    create_service(ctx, FOLDERS_SERVICE, None, accountability).await
}

pub async fn create_translations_service(
    ctx: &ExtensionContext,
    accountability: AccountabilityMode,
) -> Result<AnyService> {
    create_service(ctx, TRANSLATIONS_SERVICE, None, accountability).await
}

pub async fn create_notifications_service(
    ctx: &ExtensionContext,
    accountability: AccountabilityMode,
) -> Result<AnyService> {
    create_service(ctx, NOTIFICATIONS_SERVICE, None, accountability).await
}
