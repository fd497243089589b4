//! Function registry for formulas
//!
//! Functions are trait objects registered by name. Each function declares
//! its argument signature, executes on evaluated arguments and optionally
//! knows how to represent itself in rich-text editor documents.

#![warn(missing_docs)]

pub mod function;
pub mod functions;
pub mod signature;

pub use function::{
    FunctionContext, FunctionError, FunctionRegistry, FunctionRegistryBuilder, FunctionResult,
    RuntimeFunction, create_standard_registry, standard_registry,
};
pub use signature::{ArgumentType, FunctionSignature, ParameterInfo};
