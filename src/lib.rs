//! Formula runtime
//!
//! Parses and evaluates page formulas such as
//! `concat('Hello ', get('page_parameter.name'))` against pluggable data
//! providers, converts formulas to and from rich-text editor documents,
//! autocompletes half-typed formulas, and caches the content of remote data
//! sources with change detection and debounced refetching.
//!
//! ```rust
//! use formula_runtime::{DataLedger, resolve_formula};
//! use formula_runtime::ledger::{Application, ApplicationContext, Mode, Page};
//!
//! let page = Page { id: 1, name: "home".into(), path: "/".into(), path_params: vec![] };
//! let application = Application { id: 1, name: "app".into(), pages: vec![page.clone()] };
//! let ledger = DataLedger::new([], ApplicationContext::new(application, page, Mode::Public));
//!
//! let value = resolve_formula("concat('a', add(1, 2))", &ledger).unwrap();
//! assert_eq!(value, serde_json::json!("a3"));
//! ```

pub mod ast;
pub mod autocomplete;
pub mod cache;
pub mod evaluator;
pub mod ledger;
pub mod parser;
pub mod registry;
pub mod rich_text;
pub mod value_ext;

pub use ast::ExpressionNode;
pub use autocomplete::{Autocompleter, Candidate, Completion, FilterResult};
pub use cache::{ContentCache, DataSource, DataSourceDispatcher};
pub use evaluator::{EngineConfig, EvaluationError, EvaluationResult, FormulaEngine};
pub use ledger::{DataLedger, DataProvider};
pub use parser::{ParseError, is_valid_formula, parse};
pub use registry::{FunctionRegistry, RuntimeFunction};
pub use rich_text::EditorNode;

use once_cell::sync::Lazy;
use serde_json::Value;

static DEFAULT_ENGINE: Lazy<FormulaEngine> = Lazy::new(FormulaEngine::new);

/// Resolve a formula with the built-in functions
pub fn resolve_formula(source: &str, ledger: &DataLedger) -> EvaluationResult<Value> {
    DEFAULT_ENGINE.resolve_formula(source, ledger)
}
