// Error types for formula evaluation

use crate::parser::ParseError;
use crate::registry::FunctionError;
use thiserror::Error;

/// Result type for evaluation operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Errors that can occur during formula evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// The formula could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A called function is not registered
    #[error("Unknown function '{name}'")]
    UnknownFunction {
        /// Function name
        name: String,
    },

    /// Function evaluation error
    #[error("Function error: {0}")]
    Function(#[from] FunctionError),
}
