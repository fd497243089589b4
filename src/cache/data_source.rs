//! Data source definitions

use crate::ledger::PageId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a data source
pub type DataSourceId = i64;

/// A page data source: a configured service whose result formulas can read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    /// Data source id
    pub id: DataSourceId,
    /// Name used as first path segment after the provider name
    pub name: String,
    /// Page the data source belongs to
    pub page_id: PageId,
    /// Service type, `None` while not configured
    #[serde(default, rename = "type")]
    pub service_type: Option<String>,
    /// Service specific configuration
    #[serde(default)]
    pub config: Value,
}

impl DataSource {
    /// Create a data source with an empty configuration
    pub fn new(id: DataSourceId, name: impl Into<String>, page_id: PageId) -> Self {
        Self {
            id,
            name: name.into(),
            page_id,
            service_type: None,
            config: Value::Null,
        }
    }

    /// Set the service type
    pub fn with_service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = Some(service_type.into());
        self
    }

    /// Set the service configuration
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }
}
