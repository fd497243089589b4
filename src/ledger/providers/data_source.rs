//! Data source provider

use crate::cache::{ContentCache, DataSource};
use crate::ledger::data_ledger::DataLedger;
use crate::ledger::error::LedgerResult;
use crate::ledger::provider::DataProvider;
use crate::value_ext::ValueExt;
use async_trait::async_trait;
use serde_json::{Value, json};

/// Exposes data source content under `data_source.<name>.<path>`
///
/// Content lives in a [`ContentCache`]. Every lookup asks the cache to make
/// sure the content matches the current backend context, then reads whatever
/// content is available right now.
#[derive(Debug)]
pub struct DataSourceProvider {
    data_sources: Vec<DataSource>,
    cache: ContentCache,
}

impl DataSourceProvider {
    /// Provider name
    pub const NAME: &'static str = "data_source";

    /// Create a provider for the data sources of the current page
    pub fn new(data_sources: Vec<DataSource>, cache: ContentCache) -> Self {
        Self {
            data_sources,
            cache,
        }
    }

    /// Known data sources
    pub fn data_sources(&self) -> &[DataSource] {
        &self.data_sources
    }

    /// Content cache backing the provider
    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Data source by name
    pub fn data_source(&self, name: &str) -> Option<&DataSource> {
        self.data_sources.iter().find(|ds| ds.name == name)
    }

    /// Refetch every data source of the current page with one request
    pub async fn refresh(&self, ledger: &DataLedger) -> LedgerResult<()> {
        let page_id = ledger.context().page.id;
        self.cache
            .fetch_page(page_id, &self.data_sources, ledger.backend_context())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DataProvider for DataSourceProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        10
    }

    fn needs_backend_context(&self) -> bool {
        true
    }

    async fn init(&self, ledger: &DataLedger) -> LedgerResult<()> {
        let payload = ledger.backend_context();
        futures::future::join_all(
            self.data_sources
                .iter()
                .map(|ds| self.cache.fetch(ds, payload.clone())),
        )
        .await;
        Ok(())
    }

    fn backend_context(&self, ledger: &DataLedger) -> Option<Value> {
        Some(json!({ "page_id": ledger.context().page.id }))
    }

    fn data_chunk(&self, ledger: &DataLedger, path: &[String]) -> Option<Value> {
        let (name, rest) = path.split_first()?;
        let data_source = self.data_source(name)?;
        self.cache.smart_fetch(data_source, ledger.backend_context());
        let content = self.cache.value(data_source)?;
        content.get_path(rest).cloned()
    }
}
