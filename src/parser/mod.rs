//! Formula parser
//!
//! Turns formula source into an [`ExpressionNode`](crate::ast::ExpressionNode)
//! tree. The tokenizer is shared with the autocomplete engine.

#![warn(missing_docs)]

pub mod error;
pub mod grammar;
pub mod span;
pub mod tokenizer;

pub use error::{ParseError, ParseResult};
pub use grammar::parse_expression;
pub use span::Spanned;
pub use tokenizer::{Token, Tokenizer, escape, quote_string, tokenize, unescape};

/// Parse a formula string into an expression tree
pub fn parse(input: &str) -> ParseResult<crate::ast::ExpressionNode> {
    parse_expression(input)
}

/// Whether a formula can be parsed
///
/// Empty input is valid. Evaluation is not attempted, so unknown functions or
/// bad data paths are not detected here.
pub fn is_valid_formula(input: &str) -> bool {
    input.trim().is_empty() || parse_expression(input).is_ok()
}
