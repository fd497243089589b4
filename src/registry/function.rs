//! Function contract, function registry and its builder

use crate::ledger::DataLedger;
use crate::registry::functions::{AddFunction, ConcatFunction, GetFunction};
use crate::registry::signature::FunctionSignature;
use crate::rich_text::EditorNode;
use crate::value_ext::ValueExt;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for function operations
pub type FunctionResult<T> = Result<T, FunctionError>;

/// Function evaluation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FunctionError {
    /// Invalid number of arguments
    #[error("Function '{name}' expects {min}-{} arguments, got {actual}", max.map_or("∞".to_string(), |n| n.to_string()))]
    InvalidArity {
        /// Function name
        name: String,
        /// Minimum arguments
        min: usize,
        /// Maximum arguments (None for unlimited)
        max: Option<usize>,
        /// Actual arguments provided
        actual: usize,
    },

    /// Invalid argument type
    #[error("Function '{name}' argument {index} expects {expected}, got {actual}")]
    InvalidArgumentType {
        /// Function name
        name: String,
        /// Argument index
        index: usize,
        /// Expected type
        expected: String,
        /// Actual type
        actual: String,
    },

    /// Runtime evaluation error
    #[error("Function '{name}' evaluation error: {message}")]
    EvaluationError {
        /// Function name
        name: String,
        /// Error message
        message: String,
    },
}

/// Context handed to functions while they execute
#[derive(Clone, Copy)]
pub struct FunctionContext<'a> {
    ledger: &'a DataLedger,
}

impl<'a> FunctionContext<'a> {
    /// Create a context reading from `ledger`
    pub fn new(ledger: &'a DataLedger) -> Self {
        Self { ledger }
    }

    /// Data ledger backing lookups
    pub fn ledger(&self) -> &'a DataLedger {
        self.ledger
    }

    /// Resolve a dotted data path through the ledger
    pub fn lookup(&self, path: &str) -> Option<Value> {
        self.ledger.get(path)
    }
}

/// A function callable from formulas
///
/// Implementors describe their arguments through [`RuntimeFunction::signature`];
/// the provided methods derive validation and coercion from it. Functions that
/// have a rich-text representation additionally override the editor hooks.
pub trait RuntimeFunction: Send + Sync {
    /// Get the function name
    fn name(&self) -> &str;

    /// Get the function signature
    fn signature(&self) -> &FunctionSignature;

    /// Execute the function on validated, coerced arguments
    fn execute(&self, context: &FunctionContext<'_>, args: Vec<Value>) -> FunctionResult<Value>;

    /// Get function documentation
    fn documentation(&self) -> &str {
        ""
    }

    /// Whether the argument count is acceptable
    fn validate_number_of_args(&self, args: &[Value]) -> bool {
        self.signature().accepts_arity(args.len())
    }

    /// Index of the first argument failing its declared type, if any
    fn validate_type_of_args(&self, args: &[Value]) -> Option<usize> {
        self.signature().first_invalid_argument(args)
    }

    /// Validate arguments: arity first, then types
    fn validate_args(&self, args: &[Value]) -> FunctionResult<()> {
        let signature = self.signature();
        if !self.validate_number_of_args(args) {
            return Err(FunctionError::InvalidArity {
                name: self.name().to_string(),
                min: signature.min_arity,
                max: signature.max_arity,
                actual: args.len(),
            });
        }

        if let Some(index) = self.validate_type_of_args(args) {
            let expected = signature
                .parameters
                .get(index)
                .map(|p| p.param_type.to_string())
                .unwrap_or_default();
            return Err(FunctionError::InvalidArgumentType {
                name: self.name().to_string(),
                index,
                expected,
                actual: args[index].type_name().to_string(),
            });
        }

        Ok(())
    }

    /// Coerce each argument with its declared type
    ///
    /// Arguments beyond the declared parameters pass through unchanged.
    fn parse_args(&self, args: Vec<Value>) -> Vec<Value> {
        let parameters = &self.signature().parameters;
        args.into_iter()
            .enumerate()
            .map(|(i, arg)| match parameters.get(i) {
                Some(param) => param.param_type.parse(arg),
                None => arg,
            })
            .collect()
    }

    /// Rich-text node type owned by this function
    fn editor_node_type(&self) -> Option<&str> {
        None
    }

    /// Turn already converted argument nodes into this call's nodes
    ///
    /// `None` means the function has no rich-text representation.
    fn to_nodes(&self, _args: Vec<Vec<EditorNode>>) -> Option<Vec<EditorNode>> {
        None
    }

    /// Convert a node of [`RuntimeFunction::editor_node_type`] back to formula text
    fn node_to_formula(&self, _node: &EditorNode) -> Option<String> {
        None
    }
}

/// Registry of formula functions keyed by name
///
/// Iteration follows registration order, which is also the order function
/// names are offered for autocompletion.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: IndexMap<String, Arc<dyn RuntimeFunction>>,
}

impl FunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function, replacing any function with the same name
    pub fn register<F: RuntimeFunction + 'static>(&mut self, function: F) {
        self.register_arc(Arc::new(function));
    }

    /// Register a shared function
    pub fn register_arc(&mut self, function: Arc<dyn RuntimeFunction>) {
        let name = function.name().to_string();
        log::debug!("Registering formula function '{name}'");
        self.functions.insert(name, function);
    }

    /// Get a function by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn RuntimeFunction>> {
        self.functions.get(name)
    }

    /// Check if a function exists
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Function owning the given rich-text node type
    pub fn find_by_node_type(&self, node_type: &str) -> Option<&Arc<dyn RuntimeFunction>> {
        self.functions
            .values()
            .find(|f| f.editor_node_type() == Some(node_type))
    }

    /// Registered function names in registration order
    pub fn function_names(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }

    /// Iterate over registered functions
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn RuntimeFunction>> {
        self.functions.values()
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.function_names())
            .finish()
    }
}

/// Builder for [`FunctionRegistry`]
#[derive(Default)]
pub struct FunctionRegistryBuilder {
    registry: FunctionRegistry,
}

impl FunctionRegistryBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the built-in functions
    pub fn with_builtin_functions(mut self) -> Self {
        self.registry.register(GetFunction);
        self.registry.register(ConcatFunction);
        self.registry.register(AddFunction);
        self
    }

    /// Register an additional function
    pub fn with_function<F: RuntimeFunction + 'static>(mut self, function: F) -> Self {
        self.registry.register(function);
        self
    }

    /// Register an additional shared function
    pub fn with_function_arc(mut self, function: Arc<dyn RuntimeFunction>) -> Self {
        self.registry.register_arc(function);
        self
    }

    /// Build the registry
    pub fn build(self) -> FunctionRegistry {
        self.registry
    }
}

/// Create a registry holding the built-in functions
pub fn create_standard_registry() -> FunctionRegistry {
    FunctionRegistryBuilder::new().with_builtin_functions().build()
}

static STANDARD_REGISTRY: Lazy<Arc<FunctionRegistry>> =
    Lazy::new(|| Arc::new(create_standard_registry()));

/// Shared registry holding the built-in functions
pub fn standard_registry() -> Arc<FunctionRegistry> {
    Arc::clone(&STANDARD_REGISTRY)
}
