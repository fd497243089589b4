//! Parse errors

use thiserror::Error;

/// Result type for parse operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors raised while turning formula source into an expression tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The formula contains nothing but whitespace
    #[error("Empty formula")]
    EmptyExpression,

    /// A token appeared where the grammar does not allow it
    #[error("Unexpected token '{token}' at position {position}")]
    UnexpectedToken {
        /// Source text of the token
        token: String,
        /// Byte offset of the token
        position: usize,
    },

    /// Input ended in the middle of an expression
    #[error("Unexpected end of formula at position {position}")]
    UnexpectedEof {
        /// Byte offset of the end of input
        position: usize,
    },

    /// A string literal has no closing quote
    #[error("Unterminated string starting at position {position}")]
    UnterminatedString {
        /// Byte offset of the opening quote
        position: usize,
    },

    /// A numeric literal cannot be represented
    #[error("Invalid number '{literal}' at position {position}")]
    InvalidNumber {
        /// Source text of the number
        literal: String,
        /// Byte offset of the number
        position: usize,
    },
}

impl ParseError {
    /// Byte offset the error points at, when there is one
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEof { position }
            | ParseError::UnterminatedString { position }
            | ParseError::InvalidNumber { position, .. } => Some(*position),
            ParseError::EmptyExpression => None,
        }
    }
}
