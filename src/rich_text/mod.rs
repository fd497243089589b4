//! Bridge between formulas and rich-text editor documents
//!
//! Formulas made only of literals and functions with a rich-text form can be
//! edited as a document of text runs and formula components. This module
//! converts in both directions.

#![warn(missing_docs)]

mod from_nodes;
mod node;
mod to_nodes;

pub use from_nodes::{FromNodesVisitor, to_formula};
pub use node::{EditorNode, TEXT_NODE_TYPE, WRAPPER_NODE_TYPE};
pub use to_nodes::{ToNodesVisitor, to_nodes};

use thiserror::Error;

/// Result type for rich-text conversions
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors raised when a formula cannot be shown as rich text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// The called function is not registered
    #[error("Unknown function '{name}'")]
    UnknownFunction {
        /// Function name
        name: String,
    },

    /// The function has no rich-text form
    #[error("Function '{name}' cannot be represented as rich text")]
    UnsupportedFunction {
        /// Function name
        name: String,
    },
}
