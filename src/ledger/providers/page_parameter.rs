//! Page parameter provider

use crate::ledger::context::Mode;
use crate::ledger::data_ledger::DataLedger;
use crate::ledger::error::LedgerResult;
use crate::ledger::provider::DataProvider;
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Parameter values by name
pub type PageParameters = IndexMap<String, Value>;

/// Exposes the parameters of the current page under `page_parameter.<name>`
///
/// While editing, parameters get placeholder values based on their declared
/// type; otherwise the actual values from the application context are used.
#[derive(Debug, Default)]
pub struct PageParameterProvider {
    parameters: RwLock<Arc<PageParameters>>,
}

impl PageParameterProvider {
    /// Provider name
    pub const NAME: &'static str = "page_parameter";

    /// Create a provider with no parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current parameters
    pub fn parameters(&self) -> Arc<PageParameters> {
        Arc::clone(&self.parameters.read())
    }

    /// Set a parameter
    ///
    /// Replaces the parameter set with a new snapshot; snapshots handed out
    /// earlier are unaffected.
    pub fn set_parameter(&self, name: impl Into<String>, value: Value) {
        let mut guard = self.parameters.write();
        let mut next = PageParameters::clone(&guard);
        next.insert(name.into(), value);
        *guard = Arc::new(next);
    }
}

#[async_trait]
impl DataProvider for PageParameterProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn init(&self, ledger: &DataLedger) -> LedgerResult<()> {
        let context = ledger.context();
        if context.mode == Mode::Editing {
            for param in &context.page.path_params {
                self.set_parameter(param.name.clone(), param.param_type.placeholder());
            }
        } else {
            for (name, value) in &context.page_params_value {
                self.set_parameter(name.clone(), value.clone());
            }
        }
        Ok(())
    }

    fn backend_context(&self, _ledger: &DataLedger) -> Option<Value> {
        let parameters: Map<String, Value> = self
            .parameters()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Some(Value::Object(parameters))
    }

    fn data_chunk(&self, _ledger: &DataLedger, path: &[String]) -> Option<Value> {
        let [name] = path else {
            return None;
        };
        self.parameters.read().get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::context::{
        Application, ApplicationContext, Page, PathParam, PathParamType,
    };
    use serde_json::json;

    fn page() -> Page {
        Page {
            id: 3,
            name: "product".to_string(),
            path: "/product/:id/:slug".to_string(),
            path_params: vec![
                PathParam {
                    name: "id".to_string(),
                    param_type: PathParamType::Numeric,
                },
                PathParam {
                    name: "slug".to_string(),
                    param_type: PathParamType::Text,
                },
            ],
        }
    }

    fn ledger(mode: Mode, values: Value) -> (Arc<PageParameterProvider>, DataLedger) {
        let provider = Arc::new(PageParameterProvider::new());
        let application = Application {
            id: 1,
            name: "shop".to_string(),
            pages: vec![page()],
        };
        let params = values.as_object().cloned().unwrap_or_default();
        let context = ApplicationContext::new(application, page(), mode).with_page_params(params);
        let ledger = DataLedger::new([Arc::clone(&provider) as Arc<dyn DataProvider>], context);
        (provider, ledger)
    }

    #[tokio::test]
    async fn test_editing_mode_uses_placeholders() {
        let (_, ledger) = ledger(Mode::Editing, json!({"id": 42}));
        ledger.init().await.expect("init succeeds");

        assert_eq!(ledger.get("page_parameter.id"), Some(json!(1)));
        assert_eq!(ledger.get("page_parameter.slug"), Some(json!("test")));
    }

    #[tokio::test]
    async fn test_public_mode_uses_actual_values() {
        let (_, ledger) = ledger(Mode::Public, json!({"id": 42, "slug": "red-shoes"}));
        ledger.init().await.expect("init succeeds");

        assert_eq!(ledger.get("page_parameter.id"), Some(json!(42)));
        assert_eq!(ledger.get("page_parameter.slug"), Some(json!("red-shoes")));
        assert_eq!(
            ledger.backend_context(),
            json!({"page_parameter": {"id": 42, "slug": "red-shoes"}})
        );
    }

    #[tokio::test]
    async fn test_only_single_segment_paths_resolve() {
        let (_, ledger) = ledger(Mode::Public, json!({"id": {"nested": 1}}));
        ledger.init().await.expect("init succeeds");

        assert_eq!(ledger.get("page_parameter.id.nested"), None);
        assert_eq!(ledger.get("page_parameter"), None);
        assert_eq!(ledger.get("page_parameter.missing"), None);
    }

    #[test]
    fn test_set_parameter_keeps_old_snapshots() {
        let provider = PageParameterProvider::new();
        provider.set_parameter("id", json!(1));
        let before = provider.parameters();
        provider.set_parameter("id", json!(2));

        assert_eq!(before.get("id"), Some(&json!(1)));
        assert_eq!(provider.parameters().get("id"), Some(&json!(2)));
    }
}
