//! Cache configuration

use std::time::Duration;

/// Default quiet period before a changed lookup refetches
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// How cache entries are keyed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CacheScope {
    /// One entry per data source
    #[default]
    PerDataSource,
    /// One entry per data source and page
    PerPage,
}

/// Configuration for [`ContentCache`](super::ContentCache)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Quiet period applied to refetches after the first fetch
    pub debounce: Duration,
    /// Entry keying
    pub scope: CacheScope,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            scope: CacheScope::default(),
        }
    }
}

impl CacheConfig {
    /// Create a default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debounce period
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Set the entry keying
    pub fn with_scope(mut self, scope: CacheScope) -> Self {
        self.scope = scope;
        self
    }
}
