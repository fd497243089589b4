//! Lossless tokenizer for formula source
//!
//! Every byte of the input belongs to exactly one token, whitespace included,
//! and malformed input never aborts tokenization: unterminated strings and
//! stray characters come out as tokens. The parser rejects them; the
//! autocomplete engine needs them to reason about half-typed formulas.

use super::span::Spanned;

/// Token produced by the [`Tokenizer`]
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'input> {
    /// Identifier (function name)
    Identifier(&'input str),
    /// Numeric literal, parsed on demand
    Number(&'input str),
    /// Boolean literal
    Boolean(bool),
    /// String literal
    String {
        /// Raw content between the quotes, escapes not yet resolved
        content: &'input str,
        /// Quote character that opened the literal
        quote: char,
        /// Whether the closing quote is present
        terminated: bool,
    },
    /// Left parenthesis (
    LeftParen,
    /// Right parenthesis )
    RightParen,
    /// Comma separator (,)
    Comma,
    /// Run of whitespace
    Whitespace(&'input str),
    /// Character that has no meaning in the grammar
    Unknown(char),
}

impl Token<'_> {
    /// Whether the token is whitespace
    #[inline]
    pub fn is_trivia(&self) -> bool {
        matches!(self, Token::Whitespace(_))
    }

    /// Get identifier string if the token is one
    #[inline]
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Token::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

/// Tokenizer over a formula string
pub struct Tokenizer<'input> {
    input: &'input str,
    position: usize,
}

impl<'input> Tokenizer<'input> {
    /// Create a tokenizer for `input`
    pub fn new(input: &'input str) -> Self {
        Self { input, position: 0 }
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.position
    }

    /// Produce the next token, or `None` at end of input
    pub fn next_token(&mut self) -> Option<Spanned<Token<'input>>> {
        let rest = &self.input[self.position..];
        let first = rest.chars().next()?;
        let start = self.position;

        let (token, len) = match first {
            c if c.is_whitespace() => {
                let len = rest
                    .find(|c: char| !c.is_whitespace())
                    .unwrap_or(rest.len());
                (Token::Whitespace(&rest[..len]), len)
            }
            '(' => (Token::LeftParen, 1),
            ')' => (Token::RightParen, 1),
            ',' => (Token::Comma, 1),
            '\'' | '"' => {
                let (len, terminated) = scan_string(rest, first);
                let content_end = if terminated { len - 1 } else { len };
                let token = Token::String {
                    content: &rest[1..content_end],
                    quote: first,
                    terminated,
                };
                (token, len)
            }
            c if is_identifier_start(c) => {
                let len = rest
                    .find(|c: char| !is_identifier_continue(c))
                    .unwrap_or(rest.len());
                let token = match &rest[..len] {
                    "true" => Token::Boolean(true),
                    "false" => Token::Boolean(false),
                    name => Token::Identifier(name),
                };
                (token, len)
            }
            c if c.is_ascii_digit() => {
                let len = scan_number(rest);
                (Token::Number(&rest[..len]), len)
            }
            '-' if rest[1..].starts_with(|c: char| c.is_ascii_digit()) => {
                let len = 1 + scan_number(&rest[1..]);
                (Token::Number(&rest[..len]), len)
            }
            c => (Token::Unknown(c), c.len_utf8()),
        };

        self.position += len;
        Some(Spanned::new(token, start, start + len))
    }

    /// Tokenize the remaining input, whitespace included
    pub fn tokenize_all(&mut self) -> Vec<Spanned<Token<'input>>> {
        self.collect()
    }
}

impl<'input> Iterator for Tokenizer<'input> {
    type Item = Spanned<Token<'input>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize a whole formula
pub fn tokenize(input: &str) -> Vec<Spanned<Token<'_>>> {
    Tokenizer::new(input).tokenize_all()
}

/// Whether `c` may start an identifier
#[inline]
pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Whether `c` may continue an identifier
#[inline]
pub fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Length of the string literal at the start of `rest` and whether it is closed
fn scan_string(rest: &str, quote: char) -> (usize, bool) {
    let mut chars = rest.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote {
            return (i + c.len_utf8(), true);
        }
    }
    (rest.len(), false)
}

fn scan_number(rest: &str) -> usize {
    let int_len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if let Some(fraction) = rest[int_len..].strip_prefix('.') {
        let fraction_len = fraction
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(fraction.len());
        if fraction_len > 0 {
            return int_len + 1 + fraction_len;
        }
    }
    int_len
}

/// Resolve backslash escapes of a raw string literal content
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Escape `content` for use inside a literal delimited by `quote`
///
/// Only the delimiter itself is escaped, never the other quote character.
pub fn escape(content: &str, quote: char) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// Produce a complete string literal for `content`
pub fn quote_string(content: &str, quote: char) -> String {
    format!("{quote}{}{quote}", escape(content, quote))
}
