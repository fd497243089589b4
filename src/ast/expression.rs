//! Expression node types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::parser::quote_string;

/// A node of a parsed formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionNode {
    /// Literal value (`'hello'`, `42`, `true`)
    Literal(LiteralValue),
    /// Call of a runtime function (`concat('a', 'b')`)
    FunctionCall(FunctionCallData),
}

/// Literal values supported by the formula grammar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    /// String literal
    String(String),
    /// Integer literal
    Integer(i64),
    /// Decimal literal
    Decimal(f64),
    /// Boolean literal
    Boolean(bool),
}

/// Function call data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallData {
    /// Name of the called function
    pub name: String,
    /// Argument expressions, in call order
    pub args: Vec<ExpressionNode>,
}

impl ExpressionNode {
    /// Create a literal node
    pub fn literal(value: impl Into<LiteralValue>) -> Self {
        Self::Literal(value.into())
    }

    /// Create a string literal node
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(LiteralValue::String(value.into()))
    }

    /// Create a function call node
    pub fn function_call(
        name: impl Into<String>,
        args: impl IntoIterator<Item = ExpressionNode>,
    ) -> Self {
        Self::FunctionCall(FunctionCallData {
            name: name.into(),
            args: args.into_iter().collect(),
        })
    }
}

impl LiteralValue {
    /// Convert the literal into a runtime value
    pub fn to_value(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Integer(i) => Value::from(*i),
            Self::Decimal(d) => serde_json::Number::from_f64(*d)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Boolean(b) => Value::Bool(*b),
        }
    }

    /// Text shown for this literal inside the rich-text editor
    pub fn display_text(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Decimal(d) => d.to_string(),
            Self::Boolean(b) => b.to_string(),
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(&quote_string(s, '\'')),
            Self::Integer(i) => write!(f, "{i}"),
            // Keep a fractional part so the literal re-parses as a decimal
            Self::Decimal(d) if d.fract() == 0.0 && d.is_finite() => write!(f, "{d:.1}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// Formats the node back into formula source
impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "{literal}"),
            Self::FunctionCall(call) => {
                write!(f, "{}(", call.name)?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_through_source() {
        let expr = ExpressionNode::function_call(
            "concat",
            [
                ExpressionNode::string("it's"),
                ExpressionNode::function_call(
                    "add",
                    [ExpressionNode::literal(1i64), ExpressionNode::literal(2.0)],
                ),
            ],
        );
        assert_eq!(expr.to_string(), r"concat('it\'s', add(1, 2.0))");
    }

    #[test]
    fn test_literal_to_value() {
        assert_eq!(LiteralValue::from("x").to_value(), Value::from("x"));
        assert_eq!(LiteralValue::from(3i64).to_value(), Value::from(3));
        assert_eq!(LiteralValue::from(true).to_value(), Value::Bool(true));
        assert_eq!(LiteralValue::Decimal(f64::NAN).to_value(), Value::Null);
    }
}
