//! Cache and dispatch errors

use super::data_source::DataSourceId;
use crate::ledger::PageId;
use thiserror::Error;

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors reported by a [`DataSourceDispatcher`](super::DataSourceDispatcher)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// The request could not be delivered
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with an error
    #[error("Data source {data_source_id} failed: {message}")]
    Service {
        /// Failing data source
        data_source_id: DataSourceId,
        /// Error message from the service
        message: String,
    },
}

/// Errors surfaced by the content cache
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// A whole-page fetch failed; the page's entries were cleared
    #[error("Fetching data sources of page {page_id} failed: {source}")]
    BatchDispatch {
        /// Page being fetched
        page_id: PageId,
        /// Underlying dispatch error
        #[source]
        source: DispatchError,
    },
}
