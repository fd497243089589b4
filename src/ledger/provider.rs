//! Data provider trait

use super::data_ledger::DataLedger;
use super::error::LedgerResult;
use async_trait::async_trait;
use serde_json::Value;

/// A named source of data addressable from formulas
///
/// The first segment of a formula data path selects the provider by name;
/// the provider resolves the remaining segments.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Provider name, the first path segment of lookups it serves
    fn name(&self) -> &str;

    /// Ordering key; lower priorities initialize first
    fn priority(&self) -> i32 {
        0
    }

    /// Whether [`DataProvider::init`] reads the backend context of the others
    ///
    /// Such providers are initialized after every provider that does not.
    fn needs_backend_context(&self) -> bool {
        false
    }

    /// Prepare the provider's data
    ///
    /// Called once per ledger, in priority order within each
    /// [`needs_backend_context`](DataProvider::needs_backend_context) group,
    /// so a provider may rely on every provider initialized before it being ready.
    async fn init(&self, _ledger: &DataLedger) -> LedgerResult<()> {
        Ok(())
    }

    /// Value this provider contributes to the context sent with data fetches
    fn backend_context(&self, _ledger: &DataLedger) -> Option<Value> {
        None
    }

    /// Resolve `path`, already stripped of the provider name
    fn data_chunk(&self, ledger: &DataLedger, path: &[String]) -> Option<Value>;
}
