//! add() function - numeric addition

use crate::registry::function::{FunctionContext, FunctionError, FunctionResult, RuntimeFunction};
use crate::registry::signature::{ArgumentType, FunctionSignature, ParameterInfo};
use serde_json::{Number, Value};
use std::sync::LazyLock;

/// add(a, b) function - sums exactly two numbers
///
/// Numeric strings are accepted and converted before adding.
pub struct AddFunction;

impl RuntimeFunction for AddFunction {
    fn name(&self) -> &str {
        "add"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: LazyLock<FunctionSignature> = LazyLock::new(|| {
            FunctionSignature::new(
                "add",
                vec![
                    ParameterInfo::new("a", ArgumentType::Number),
                    ParameterInfo::new("b", ArgumentType::Number),
                ],
            )
            .with_min_arity(2)
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "Adds two numbers."
    }

    fn execute(&self, _context: &FunctionContext<'_>, args: Vec<Value>) -> FunctionResult<Value> {
        let [left, right] = args.as_slice() else {
            return Err(self.error(format!("expected 2 arguments, got {}", args.len())));
        };

        if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
            if let Some(sum) = a.checked_add(b) {
                return Ok(Value::from(sum));
            }
        }

        let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
            return Err(self.error("arguments are not numbers".to_string()));
        };
        Number::from_f64(a + b)
            .map(Value::Number)
            .ok_or_else(|| self.error("result is not a finite number".to_string()))
    }
}

impl AddFunction {
    fn error(&self, message: String) -> FunctionError {
        FunctionError::EvaluationError {
            name: self.name().to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(vec![json!(1), json!(2)], true)]
    #[case(vec![json!("1"), json!("2")], true)]
    #[case(vec![json!(1.5), json!("2.25")], true)]
    #[case(vec![json!(1)], false)]
    #[case(vec![json!(1), json!(2), json!(3)], false)]
    #[case(vec![json!("test"), json!(2)], false)]
    #[case(vec![json!(1), json!("test")], false)]
    #[case(vec![Value::Null, json!(2)], false)]
    fn test_add_validation(#[case] args: Vec<Value>, #[case] valid: bool) {
        assert_eq!(AddFunction.validate_args(&args).is_ok(), valid);
    }

    #[test]
    fn test_add_reports_failing_index() {
        assert_eq!(
            AddFunction.validate_type_of_args(&[json!(1), json!("test")]),
            Some(1)
        );
        assert_eq!(AddFunction.validate_type_of_args(&[json!(1), json!("2")]), None);
    }

    #[test]
    fn test_parse_args_converts_numeric_strings() {
        assert_eq!(
            AddFunction.parse_args(vec![json!("1"), json!("2.5")]),
            vec![json!(1), json!(2.5)]
        );
    }
}
