//! Data source content caching
//!
//! Data sources are fetched through a [`DataSourceDispatcher`] and their
//! latest content is kept in a [`ContentCache`]. Lookups made while a formula
//! is evaluated go through [`ContentCache::smart_fetch`], which refetches only
//! when the data source configuration or the request payload changed, and
//! debounces bursts of changes into a single request.

#![warn(missing_docs)]

mod config;
mod content;
mod data_source;
mod dispatcher;
mod error;

pub use config::{CacheConfig, CacheScope, DEFAULT_DEBOUNCE};
pub use content::{CacheKey, CacheStats, ContentCache, EntryState, Fingerprint};
pub use data_source::{DataSource, DataSourceId};
pub use dispatcher::{DataSourceDispatcher, ERROR_MARKER, is_error_marker};
pub use error::{CacheError, CacheResult, DispatchError};
