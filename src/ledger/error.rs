//! Ledger errors

use super::context::PageId;
use crate::cache::CacheError;
use thiserror::Error;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors raised while building or initializing a data ledger
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// The requested page does not belong to the application
    #[error("Page {page_id} not found in application {application_id}")]
    PageNotFound {
        /// Requested page id
        page_id: PageId,
        /// Application that was searched
        application_id: i64,
    },

    /// A provider failed to initialize
    #[error("Provider '{provider}' failed to initialize: {message}")]
    ProviderInit {
        /// Provider name
        provider: String,
        /// Failure description
        message: String,
    },

    /// Fetching data source content failed
    #[error(transparent)]
    Cache(#[from] CacheError),
}
