//! Cursor context detection

use crate::parser::{Spanned, Token, tokenize};

/// String literal the cursor sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LiteralSpan {
    /// Delimiter of the literal
    pub quote: char,
    /// Byte offset right after the opening quote
    pub content_start: usize,
    /// Byte offset of the closing quote, if present
    pub closing: Option<usize>,
}

/// What the text around the cursor allows completing
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CursorContext {
    /// Typing a function name
    Function {
        /// Byte offset where the identifier starts
        start: usize,
        /// Whether identifier characters follow the cursor
        mid_identifier: bool,
    },
    /// Typing the argument of a lookup function
    Field {
        /// Literal being typed in, `None` right after the opening parenthesis
        literal: Option<LiteralSpan>,
    },
    /// Nothing structural to complete
    Unstructured,
}

/// Classify the cursor position
///
/// `cursor` is a byte offset on a character boundary of `source`.
pub(crate) fn detect<S: AsRef<str>>(source: &str, cursor: usize, lookup_functions: &[S]) -> CursorContext {
    let tokens: Vec<_> = tokenize(source)
        .into_iter()
        .filter(|token| !token.value.is_trivia())
        .collect();
    let is_lookup = |index: usize| {
        tokens[index]
            .value
            .as_identifier()
            .is_some_and(|name| lookup_functions.iter().any(|f| f.as_ref() == name))
    };
    // `name(` directly before token `index`
    let follows_lookup_call = |index: usize| {
        index >= 2 && tokens[index - 1].value == Token::LeftParen && is_lookup(index - 2)
    };

    for (index, token) in tokens.iter().enumerate() {
        if let Some(literal) = literal_containing(token, cursor) {
            return if follows_lookup_call(index) {
                CursorContext::Field {
                    literal: Some(literal),
                }
            } else {
                CursorContext::Unstructured
            };
        }

        if matches!(token.value, Token::Identifier(_)) && token.touches(cursor) {
            let called = tokens
                .get(index + 1)
                .is_some_and(|next| next.value == Token::LeftParen);
            return if called {
                CursorContext::Unstructured
            } else {
                CursorContext::Function {
                    start: token.start,
                    mid_identifier: cursor < token.end,
                }
            };
        }
    }

    // Right after `lookup(`, nothing typed yet
    let before = tokens.iter().rposition(|token| token.end <= cursor);
    if let Some(index) = before {
        let next_is_literal = tokens
            .get(index + 1)
            .is_some_and(|next| matches!(next.value, Token::String { .. }));
        if tokens[index].value == Token::LeftParen
            && index >= 1
            && is_lookup(index - 1)
            && !next_is_literal
        {
            return CursorContext::Field { literal: None };
        }
    }

    CursorContext::Unstructured
}

fn literal_containing(token: &Spanned<Token<'_>>, cursor: usize) -> Option<LiteralSpan> {
    let Token::String {
        quote, terminated, ..
    } = token.value
    else {
        return None;
    };
    let content_start = token.start + quote.len_utf8();
    let closing = terminated.then(|| token.end - quote.len_utf8());
    let content_end = closing.unwrap_or(token.end);

    (content_start..=content_end)
        .contains(&cursor)
        .then_some(LiteralSpan {
            quote,
            content_start,
            closing,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOOKUPS: [&str; 1] = ["field"];

    fn at_marker(marked: &str) -> CursorContext {
        let cursor = marked.find('$').expect("cursor marker");
        detect(&marked.replacen('$', "", 1), cursor, &LOOKUPS)
    }

    #[test]
    fn test_function_context() {
        assert_eq!(
            at_marker("fi$"),
            CursorContext::Function {
                start: 0,
                mid_identifier: false
            }
        );
        assert_eq!(
            at_marker("upper(f$i)"),
            CursorContext::Function {
                start: 6,
                mid_identifier: true
            }
        );
        assert_eq!(at_marker("u$("), CursorContext::Unstructured);
    }

    #[test]
    fn test_field_context() {
        assert_eq!(
            at_marker("field('ab$')"),
            CursorContext::Field {
                literal: Some(LiteralSpan {
                    quote: '\'',
                    content_start: 7,
                    closing: Some(9),
                })
            }
        );
        assert_eq!(
            at_marker("field(\"$"),
            CursorContext::Field {
                literal: Some(LiteralSpan {
                    quote: '"',
                    content_start: 7,
                    closing: None,
                })
            }
        );
        assert_eq!(at_marker("field( $"), CursorContext::Field { literal: None });
    }

    #[test]
    fn test_unstructured_context() {
        assert_eq!(at_marker("$"), CursorContext::Unstructured);
        assert_eq!(at_marker("lower()$"), CursorContext::Unstructured);
        assert_eq!(at_marker("field('')$"), CursorContext::Unstructured);
        assert_eq!(at_marker("field(''$"), CursorContext::Unstructured);
        assert_eq!(at_marker("field2('$"), CursorContext::Unstructured);
        assert_eq!(at_marker("concat('a$')"), CursorContext::Unstructured);
    }
}
