//! Parser for the formula grammar
//!
//! ```text
//! formula := expr EOF
//! expr    := call | STRING | NUMBER | BOOLEAN
//! call    := IDENT '(' [ expr ( ',' expr )* ] ')'
//! ```
//!
//! Open calls live on an explicit stack, so nesting depth is bounded only
//! by memory.

use super::error::{ParseError, ParseResult};
use super::span::Spanned;
use super::tokenizer::{Token, Tokenizer, unescape};
use crate::ast::{ExpressionNode, FunctionCallData, LiteralValue};

/// Parse a formula into an expression tree
pub fn parse_expression(input: &str) -> ParseResult<ExpressionNode> {
    let tokens: Vec<_> = Tokenizer::new(input)
        .filter(|token| !token.value.is_trivia())
        .collect();

    if tokens.is_empty() {
        return Err(ParseError::EmptyExpression);
    }

    let mut parser = Parser {
        input,
        tokens,
        position: 0,
    };
    let expression = parser.parse_expr()?;

    match parser.next() {
        None => Ok(expression),
        Some(token) => Err(parser.unexpected(&token)),
    }
}

struct Parser<'input> {
    input: &'input str,
    tokens: Vec<Spanned<Token<'input>>>,
    position: usize,
}

/// A call whose closing parenthesis has not been reached yet
struct OpenCall<'input> {
    name: &'input str,
    args: Vec<ExpressionNode>,
}

impl OpenCall<'_> {
    fn close(self) -> ExpressionNode {
        ExpressionNode::FunctionCall(FunctionCallData {
            name: self.name.to_string(),
            args: self.args,
        })
    }
}

/// What the parser found at the start of an expression
enum Operand<'input> {
    Complete(ExpressionNode),
    Open(OpenCall<'input>),
}

impl<'input> Parser<'input> {
    fn next(&mut self) -> Option<Spanned<Token<'input>>> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn peek(&self) -> Option<&Token<'input>> {
        self.tokens.get(self.position).map(|t| &t.value)
    }

    fn eof(&self) -> ParseError {
        ParseError::UnexpectedEof {
            position: self.input.len(),
        }
    }

    fn unexpected(&self, token: &Spanned<Token<'input>>) -> ParseError {
        ParseError::UnexpectedToken {
            token: self.input[token.start..token.end].to_string(),
            position: token.start,
        }
    }

    fn parse_expr(&mut self) -> ParseResult<ExpressionNode> {
        let mut open: Vec<OpenCall<'input>> = Vec::new();

        loop {
            let mut node = match self.parse_operand()? {
                Operand::Complete(node) => node,
                Operand::Open(call) => {
                    open.push(call);
                    continue;
                }
            };

            // Attach the finished node to its enclosing call, closing as many
            // calls as there are right parentheses
            loop {
                let Some(mut call) = open.pop() else {
                    return Ok(node);
                };
                call.args.push(node);

                let token = self.next().ok_or_else(|| self.eof())?;
                match token.value {
                    Token::Comma => {
                        open.push(call);
                        break;
                    }
                    Token::RightParen => node = call.close(),
                    _ => return Err(self.unexpected(&token)),
                }
            }
        }
    }

    fn parse_operand(&mut self) -> ParseResult<Operand<'input>> {
        let token = self.next().ok_or_else(|| self.eof())?;

        let literal = match token.value {
            Token::String {
                content,
                terminated: true,
                ..
            } => LiteralValue::String(unescape(content)),
            Token::String {
                terminated: false, ..
            } => {
                return Err(ParseError::UnterminatedString {
                    position: token.start,
                });
            }
            Token::Number(literal) => parse_number(literal, token.start)?,
            Token::Boolean(value) => LiteralValue::Boolean(value),
            Token::Identifier(name) => return self.parse_call_head(name),
            _ => return Err(self.unexpected(&token)),
        };
        Ok(Operand::Complete(ExpressionNode::Literal(literal)))
    }

    fn parse_call_head(&mut self, name: &'input str) -> ParseResult<Operand<'input>> {
        match self.next() {
            Some(Spanned {
                value: Token::LeftParen,
                ..
            }) => {}
            Some(token) => return Err(self.unexpected(&token)),
            None => return Err(self.eof()),
        }

        let call = OpenCall {
            name,
            args: Vec::new(),
        };
        if self.peek() == Some(&Token::RightParen) {
            self.position += 1;
            return Ok(Operand::Complete(call.close()));
        }
        Ok(Operand::Open(call))
    }
}

fn parse_number(literal: &str, position: usize) -> ParseResult<LiteralValue> {
    if !literal.contains('.') {
        if let Ok(value) = literal.parse::<i64>() {
            return Ok(LiteralValue::Integer(value));
        }
    }
    literal
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(LiteralValue::Decimal)
        .ok_or_else(|| ParseError::InvalidNumber {
            literal: literal.to_string(),
            position,
        })
}
