//! Function signatures and argument types

use crate::value_ext::ValueExt;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Argument type a function may declare for each position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentType {
    /// Numbers, or strings that parse as numbers
    Number,
    /// Text, numbers and booleans
    Text,
}

impl ArgumentType {
    /// Whether `value` is acceptable for this type
    pub fn test(&self, value: &Value) -> bool {
        match self {
            ArgumentType::Number => value.as_formula_number().is_some(),
            ArgumentType::Text => {
                matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
            }
        }
    }

    /// Coerce an accepted value into its canonical form
    ///
    /// Values that fail [`ArgumentType::test`] are returned unchanged.
    pub fn parse(&self, value: Value) -> Value {
        match self {
            ArgumentType::Number => value.as_str().and_then(parse_number).unwrap_or(value),
            ArgumentType::Text => match value {
                Value::Number(_) | Value::Bool(_) => Value::String(value.to_formula_string()),
                other => other,
            },
        }
    }
}

fn parse_number(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Some(Value::from(integer));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentType::Number => write!(f, "number"),
            ArgumentType::Text => write!(f, "text"),
        }
    }
}

/// Parameter information for functions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub param_type: ArgumentType,
}

impl ParameterInfo {
    /// Create a parameter
    pub fn new(name: impl Into<String>, param_type: ArgumentType) -> Self {
        Self {
            name: name.into(),
            param_type,
        }
    }
}

/// Function signature used for argument validation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Function name
    pub name: String,
    /// Declared parameters, checked positionally
    pub parameters: Vec<ParameterInfo>,
    /// Minimum number of arguments
    pub min_arity: usize,
    /// Maximum number of arguments (None for variadic)
    pub max_arity: Option<usize>,
}

impl FunctionSignature {
    /// Signature with declared parameters
    ///
    /// Every declared parameter may be omitted; supplying more arguments
    /// than declared is an arity error.
    pub fn new(name: impl Into<String>, parameters: Vec<ParameterInfo>) -> Self {
        let max_arity = Some(parameters.len());
        Self {
            name: name.into(),
            parameters,
            min_arity: 0,
            max_arity,
        }
    }

    /// Signature accepting any number of untyped arguments
    pub fn variadic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            min_arity: 0,
            max_arity: None,
        }
    }

    /// Require at least `min` arguments
    pub fn with_min_arity(mut self, min: usize) -> Self {
        self.min_arity = min;
        self
    }

    /// Check an argument count against the arity bounds
    pub fn accepts_arity(&self, count: usize) -> bool {
        count >= self.min_arity && self.max_arity.is_none_or(|max| count <= max)
    }

    /// Index of the first argument failing its declared type
    pub fn first_invalid_argument(&self, args: &[Value]) -> Option<usize> {
        args.iter()
            .zip(&self.parameters)
            .position(|(arg, param)| !param.param_type.test(arg))
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        if self.max_arity.is_none() && self.parameters.is_empty() {
            write!(f, "...")?;
        }
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", param.name, param.param_type)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_argument_type() {
        let ty = ArgumentType::Number;
        assert!(ty.test(&json!(1)));
        assert!(ty.test(&json!("42")));
        assert!(ty.test(&json!("4.5")));
        assert!(!ty.test(&json!("test")));
        assert!(!ty.test(&Value::Null));

        assert_eq!(ty.parse(json!("42")), json!(42));
        assert_eq!(ty.parse(json!("4.5")), json!(4.5));
        assert_eq!(ty.parse(json!(7)), json!(7));
    }

    #[test]
    fn test_text_argument_type() {
        let ty = ArgumentType::Text;
        assert!(ty.test(&json!("a")));
        assert!(ty.test(&json!(1)));
        assert!(ty.test(&json!(false)));
        assert!(!ty.test(&Value::Null));
        assert!(!ty.test(&json!({"a": 1})));

        assert_eq!(ty.parse(json!(12)), json!("12"));
        assert_eq!(ty.parse(json!(true)), json!("true"));
    }

    #[test]
    fn test_signature_arity() {
        let sig = FunctionSignature::new(
            "add",
            vec![
                ParameterInfo::new("a", ArgumentType::Number),
                ParameterInfo::new("b", ArgumentType::Number),
            ],
        );
        assert!(sig.accepts_arity(0));
        assert!(sig.accepts_arity(2));
        assert!(!sig.accepts_arity(3));

        let sig = sig.with_min_arity(2);
        assert!(!sig.accepts_arity(1));
        assert_eq!(sig.to_string(), "add(a: number, b: number)");

        let variadic = FunctionSignature::variadic("concat").with_min_arity(2);
        assert!(variadic.accepts_arity(10));
        assert!(!variadic.accepts_arity(1));
        assert_eq!(variadic.to_string(), "concat(...)");
    }

    #[test]
    fn test_first_invalid_argument() {
        let sig = FunctionSignature::new(
            "add",
            vec![
                ParameterInfo::new("a", ArgumentType::Number),
                ParameterInfo::new("b", ArgumentType::Number),
            ],
        );
        assert_eq!(sig.first_invalid_argument(&[json!(1), json!("2")]), None);
        assert_eq!(sig.first_invalid_argument(&[json!(1), json!("x")]), Some(1));
        assert_eq!(sig.first_invalid_argument(&[json!("x"), json!("y")]), Some(0));
    }
}
