//! Dispatcher trait: the network seam of the cache

use super::data_source::{DataSource, DataSourceId};
use super::error::DispatchError;
use crate::ledger::PageId;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Key marking a failed data source inside a batch response
pub const ERROR_MARKER: &str = "_error";

/// Whether a batch response entry carries the error marker
pub fn is_error_marker(value: &Value) -> bool {
    value.get(ERROR_MARKER).is_some()
}

/// Executes data source requests
#[async_trait]
pub trait DataSourceDispatcher: Send + Sync {
    /// Fetch one data source with the given backend context
    async fn dispatch(&self, data_source: &DataSource, payload: &Value) -> Result<Value, DispatchError>;

    /// Fetch every data source of a page
    ///
    /// Failed data sources are reported with an object holding [`ERROR_MARKER`].
    async fn dispatch_all(
        &self,
        page_id: PageId,
        payload: &Value,
    ) -> Result<HashMap<DataSourceId, Value>, DispatchError>;

    /// Whether a data source is configured well enough to be fetched
    fn is_valid(&self, _data_source: &DataSource) -> bool {
        true
    }
}
