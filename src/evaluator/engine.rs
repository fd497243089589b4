//! Formula engine: parsing, caching and tree evaluation

use super::config::EngineConfig;
use super::error::{EvaluationError, EvaluationResult};
use crate::ast::{ExpressionNode, FunctionCallData};
use crate::ledger::DataLedger;
use crate::parser;
use crate::registry::{FunctionContext, FunctionRegistry, RuntimeFunction, standard_registry};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::Arc;

/// Evaluates formulas with a function registry
///
/// Evaluation is depth-first and left-to-right: every argument of a call is
/// evaluated before the call's own arguments are validated and coerced.
pub struct FormulaEngine {
    registry: Arc<FunctionRegistry>,
    config: EngineConfig,
    ast_cache: Mutex<FxHashMap<String, Arc<ExpressionNode>>>,
}

impl FormulaEngine {
    /// Create an engine with the built-in functions
    pub fn new() -> Self {
        Self::with_registry(standard_registry())
    }

    /// Create an engine with a custom registry
    pub fn with_registry(registry: Arc<FunctionRegistry>) -> Self {
        Self {
            registry,
            config: EngineConfig::default(),
            ast_cache: Mutex::new(FxHashMap::default()),
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Function registry
    pub fn registry(&self) -> &Arc<FunctionRegistry> {
        &self.registry
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether `source` is syntactically valid; empty input is valid
    pub fn is_valid_formula(&self, source: &str) -> bool {
        parser::is_valid_formula(source)
    }

    /// Parse `source`, reusing a cached tree when available
    pub fn parse(&self, source: &str) -> EvaluationResult<Arc<ExpressionNode>> {
        if !self.config.enable_ast_cache {
            return Ok(Arc::new(parser::parse(source)?));
        }

        if let Some(cached) = self.ast_cache.lock().get(source) {
            return Ok(Arc::clone(cached));
        }

        let expression = Arc::new(parser::parse(source)?);
        let mut cache = self.ast_cache.lock();
        if cache.len() >= self.config.max_cache_size {
            log::debug!("Formula cache full ({} entries), clearing", cache.len());
            cache.clear();
        }
        if self.config.max_cache_size > 0 {
            cache.insert(source.to_string(), Arc::clone(&expression));
        }
        Ok(expression)
    }

    /// Drop all cached parsed formulas
    pub fn clear_cache(&self) {
        self.ast_cache.lock().clear();
    }

    /// Parse and evaluate `source` against `ledger`
    ///
    /// An empty or blank formula evaluates to the empty string.
    pub fn resolve_formula(&self, source: &str, ledger: &DataLedger) -> EvaluationResult<Value> {
        if source.trim().is_empty() {
            return Ok(Value::String(String::new()));
        }
        let expression = self.parse(source)?;
        self.evaluate(&expression, ledger)
    }

    /// Evaluate an expression tree against `ledger`
    ///
    /// The walk keeps its own stack, so arbitrarily deep trees such as long
    /// left-folded `concat` chains evaluate without exhausting the call stack.
    pub fn evaluate(&self, expression: &ExpressionNode, ledger: &DataLedger) -> EvaluationResult<Value> {
        let context = FunctionContext::new(ledger);
        let mut steps = vec![Step::Visit(expression)];
        let mut values: Vec<Value> = Vec::new();

        while let Some(step) = steps.pop() {
            match step {
                Step::Visit(ExpressionNode::Literal(literal)) => values.push(literal.to_value()),
                Step::Visit(ExpressionNode::FunctionCall(call)) => {
                    let function = self
                        .registry
                        .get(&call.name)
                        .ok_or_else(|| EvaluationError::UnknownFunction {
                            name: call.name.clone(),
                        })?;
                    steps.push(Step::Apply(call, function));
                    steps.extend(call.args.iter().rev().map(Step::Visit));
                }
                Step::Apply(call, function) => {
                    let args = values.split_off(values.len().saturating_sub(call.args.len()));
                    function.validate_args(&args)?;
                    let args = function.parse_args(args);
                    let result = function.execute(&context, args)?;
                    log::trace!("{}(..) evaluated to {result}", call.name);
                    values.push(result);
                }
            }
        }

        Ok(values.pop().unwrap_or_default())
    }
}

/// Pending work of [`FormulaEngine::evaluate`]
enum Step<'a> {
    /// Evaluate a node, pushing its value
    Visit(&'a ExpressionNode),
    /// Call a function with the values its arguments left on the stack
    Apply(&'a FunctionCallData, &'a Arc<dyn RuntimeFunction>),
}

impl Default for FormulaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FormulaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormulaEngine")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
