//! Engine configuration for formula evaluation

/// Configuration for [`FormulaEngine`](super::FormulaEngine)
///
/// # Examples
///
/// ```rust
/// use formula_runtime::evaluator::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_ast_cache(true)
///     .with_cache_size(100);
/// assert_eq!(config.max_cache_size, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Keep parsed formulas so repeated resolutions skip parsing. Default: true
    pub enable_ast_cache: bool,

    /// Maximum number of cached parsed formulas. Default: 1000
    pub max_cache_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_ast_cache: true,
            max_cache_size: 1000,
        }
    }
}

impl EngineConfig {
    /// Create new configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the parsed formula cache
    pub fn with_ast_cache(mut self, enabled: bool) -> Self {
        self.enable_ast_cache = enabled;
        self
    }

    /// Set maximum cache size
    pub fn with_cache_size(mut self, size: usize) -> Self {
        self.max_cache_size = size;
        self
    }
}
