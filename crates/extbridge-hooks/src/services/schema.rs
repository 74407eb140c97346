//! Access to the host's data-model snapshot

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Snapshot of the host's collections, fields and relations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaOverview(pub Value);

impl SchemaOverview {
    /// Whether the snapshot lists `collection`
    pub fn has_collection(&self, collection: &str) -> bool {
        self.0
            .get("collections")
            .and_then(|collections| collections.get(collection))
            .is_some()
    }
}

/// Supplies the current schema snapshot to service constructors
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    async fn get_schema(&self) -> Result<SchemaOverview>;
}

/// Provider returning a fixed snapshot
#[derive(Debug, Clone, Default)]
pub struct StaticSchema {
    overview: SchemaOverview,
}

impl StaticSchema {
    pub fn new(overview: SchemaOverview) -> Self {
        Self { overview }
    }
}

#[async_trait]
impl SchemaProvider for StaticSchema {
    async fn get_schema(&self) -> Result<SchemaOverview> {
        Ok(self.overview.clone())
    }
}
