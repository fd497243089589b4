//! Data ledger: providers combined behind a single path lookup

use super::context::ApplicationContext;
use super::error::{LedgerError, LedgerResult};
use super::provider::DataProvider;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Split path segments
pub type PathSegments = SmallVec<[String; 4]>;

/// Split a data path into segments
///
/// Segments are separated by dots; bracketed indexes become their own
/// segment, so `a.b[0].c` and `a.b.0.c` are equivalent.
pub fn to_path(path: &str) -> PathSegments {
    let mut segments = PathSegments::new();
    let mut current = String::new();
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '.' => segments.push(std::mem::take(&mut current)),
            '[' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
                segments.push(chars.by_ref().take_while(|&c| c != ']').collect());
                if chars.peek() == Some(&'.') {
                    chars.next();
                }
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Ordered set of data providers plus the application context they share
pub struct DataLedger {
    providers: Vec<Arc<dyn DataProvider>>,
    context: ApplicationContext,
    initialized: OnceCell<()>,
}

impl DataLedger {
    /// Create a ledger; providers are ordered by priority, ties keep input order
    pub fn new(
        providers: impl IntoIterator<Item = Arc<dyn DataProvider>>,
        context: ApplicationContext,
    ) -> Self {
        let mut providers: Vec<_> = providers.into_iter().collect();
        providers.sort_by_key(|provider| provider.priority());
        Self {
            providers,
            context,
            initialized: OnceCell::new(),
        }
    }

    /// Application context
    pub fn context(&self) -> &ApplicationContext {
        &self.context
    }

    /// Providers in priority order
    pub fn providers(&self) -> &[Arc<dyn DataProvider>] {
        &self.providers
    }

    /// First provider registered under `name`
    pub fn provider(&self, name: &str) -> Option<&Arc<dyn DataProvider>> {
        self.providers.iter().find(|provider| provider.name() == name)
    }

    /// Initialize every provider in priority order
    ///
    /// Providers that read the backend context start after all the others,
    /// so the context they see is complete. Runs at most once; later calls
    /// return immediately once a run succeeded.
    pub async fn init(&self) -> LedgerResult<()> {
        self.initialized
            .get_or_try_init(|| async {
                let (independent, dependent): (Vec<_>, Vec<_>) = self
                    .providers
                    .iter()
                    .partition(|provider| !provider.needs_backend_context());
                for provider in independent.into_iter().chain(dependent) {
                    log::debug!("Initializing data provider '{}'", provider.name());
                    provider.init(self).await?;
                }
                Ok::<(), LedgerError>(())
            })
            .await
            .map(|_| ())
    }

    /// Whether [`DataLedger::init`] completed
    pub fn is_initialized(&self) -> bool {
        self.initialized.initialized()
    }

    /// Backend context of every provider that contributes one, keyed by provider name
    pub fn backend_context(&self) -> Value {
        let context: Map<String, Value> = self
            .providers
            .iter()
            .filter_map(|provider| {
                provider
                    .backend_context(self)
                    .map(|value| (provider.name().to_string(), value))
            })
            .collect();
        Value::Object(context)
    }

    /// Resolve a dotted data path
    pub fn get(&self, path: &str) -> Option<Value> {
        self.resolve(&to_path(path))
    }

    /// Resolve split path segments
    ///
    /// Returns `None` when the path is empty, no provider has the name of
    /// the first segment, or the provider finds nothing.
    pub fn resolve(&self, path: &[String]) -> Option<Value> {
        let (name, rest) = path.split_first()?;
        let provider = self.provider(name)?;
        let value = provider.data_chunk(self, rest);
        log::trace!("Resolved '{}' to {:?}", path.join("."), value);
        value
    }
}

impl std::fmt::Debug for DataLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.providers.iter().map(|p| p.name()).collect();
        f.debug_struct("DataLedger")
            .field("providers", &names)
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::context::{Application, Mode, Page};
    use crate::value_ext::ValueExt;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct StaticProvider {
        name: &'static str,
        priority: i32,
        needs_context: bool,
        data: Value,
        init_log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl DataProvider for StaticProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn needs_backend_context(&self) -> bool {
            self.needs_context
        }

        async fn init(&self, _ledger: &DataLedger) -> LedgerResult<()> {
            self.init_log.lock().push(self.name);
            Ok(())
        }

        fn backend_context(&self, _ledger: &DataLedger) -> Option<Value> {
            Some(json!({"from": self.name}))
        }

        fn data_chunk(&self, _ledger: &DataLedger, path: &[String]) -> Option<Value> {
            self.data.get_path(path).cloned()
        }
    }

    fn context() -> ApplicationContext {
        let page = Page {
            id: 1,
            name: "home".to_string(),
            path: "/".to_string(),
            path_params: Vec::new(),
        };
        let application = Application {
            id: 1,
            name: "app".to_string(),
            pages: vec![page.clone()],
        };
        ApplicationContext::new(application, page, Mode::Public)
    }

    fn ledger(log: &Arc<Mutex<Vec<&'static str>>>) -> DataLedger {
        let provider = |name, priority, data| -> Arc<dyn DataProvider> {
            Arc::new(StaticProvider {
                name,
                priority,
                needs_context: false,
                data,
                init_log: Arc::clone(log),
            })
        };
        DataLedger::new(
            [
                provider("late", 5, json!({"x": 1})),
                provider("first", 0, json!({"rows": [{"name": "a"}, {"name": "b"}]})),
                provider("second", 0, json!({})),
            ],
            context(),
        )
    }

    #[test]
    fn test_to_path() {
        assert_eq!(to_path("a.b.c").as_slice(), ["a", "b", "c"]);
        assert_eq!(to_path("a.b[0].c").as_slice(), ["a", "b", "0", "c"]);
        assert_eq!(to_path("a[1][2]").as_slice(), ["a", "1", "2"]);
        assert!(to_path("").is_empty());
    }

    #[tokio::test]
    async fn test_init_runs_in_priority_order_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let ledger = ledger(&log);
        ledger.init().await.expect("init succeeds");
        ledger.init().await.expect("second init is a no-op");
        assert!(ledger.is_initialized());
        assert_eq!(*log.lock(), vec!["first", "second", "late"]);
    }

    #[tokio::test]
    async fn test_backend_context_readers_initialize_last() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let provider = |name, priority, needs_context| -> Arc<dyn DataProvider> {
            Arc::new(StaticProvider {
                name,
                priority,
                needs_context,
                data: json!({}),
                init_log: Arc::clone(&log),
            })
        };
        let ledger = DataLedger::new(
            [
                provider("late", 5, false),
                provider("reader", -10, true),
                provider("first", 0, false),
                provider("other_reader", -20, true),
            ],
            context(),
        );

        ledger.init().await.expect("init succeeds");
        assert_eq!(*log.lock(), vec!["first", "late", "other_reader", "reader"]);
    }

    #[test]
    fn test_resolve() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let ledger = ledger(&log);
        assert_eq!(ledger.get("first.rows[1].name"), Some(json!("b")));
        assert_eq!(ledger.get("first.rows.0.name"), Some(json!("a")));
        assert_eq!(ledger.get("late.x"), Some(json!(1)));
        assert_eq!(ledger.get("missing.x"), None);
        assert_eq!(ledger.get("first.rows.7"), None);
        assert_eq!(ledger.get(""), None);
    }

    #[test]
    fn test_backend_context_keyed_by_provider() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let ledger = ledger(&log);
        assert_eq!(
            ledger.backend_context(),
            json!({
                "first": {"from": "first"},
                "second": {"from": "second"},
                "late": {"from": "late"},
            })
        );
    }
}
