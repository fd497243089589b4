//! Expression tree definitions for formulas
//!
//! A formula is parsed into a tree of literal and function call nodes. The tree
//! is immutable once produced and is consumed by the evaluator and by the
//! rich-text bridge.

#![warn(missing_docs)]

mod expression;
mod visitor;

pub use expression::*;
pub use visitor::*;
