//! Extension helpers for runtime values
//!
//! Formula values are plain `serde_json::Value`s. This module adds the few
//! conversions the runtime needs on top of them.

use serde_json::Value;

/// Formula-specific helpers for [`Value`]
pub trait ValueExt {
    /// String form used when a value is concatenated or passed as text
    ///
    /// `null` becomes the empty string, strings are used verbatim and every
    /// other value uses its JSON spelling.
    fn to_formula_string(&self) -> String;

    /// Numeric view of the value, accepting numeric strings
    fn as_formula_number(&self) -> Option<f64>;

    /// Short type name for error messages
    fn type_name(&self) -> &'static str;

    /// Navigate into objects and arrays following `path`
    ///
    /// Array elements are addressed with decimal segments. An empty path
    /// returns the value itself.
    fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value>;
}

impl ValueExt for Value {
    fn to_formula_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn as_formula_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
            }
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "text",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        path.iter().try_fold(self, |current, segment| {
            let segment = segment.as_ref();
            match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_formula_string() {
        assert_eq!(Value::Null.to_formula_string(), "");
        assert_eq!(json!("a").to_formula_string(), "a");
        assert_eq!(json!(3).to_formula_string(), "3");
        assert_eq!(json!(true).to_formula_string(), "true");
        assert_eq!(json!({"a": 1}).to_formula_string(), "{\"a\":1}");
    }

    #[test]
    fn test_as_formula_number() {
        assert_eq!(json!(2).as_formula_number(), Some(2.0));
        assert_eq!(json!(" 2.5 ").as_formula_number(), Some(2.5));
        assert_eq!(json!("").as_formula_number(), None);
        assert_eq!(json!("test").as_formula_number(), None);
        assert_eq!(json!("inf").as_formula_number(), None);
        assert_eq!(json!(true).as_formula_number(), None);
    }

    #[test]
    fn test_get_path() {
        let value = json!({"rows": [{"name": "first"}, {"name": "second"}]});
        assert_eq!(value.get_path(&["rows", "1", "name"]), Some(&json!("second")));
        assert_eq!(value.get_path(&["rows", "x"]), None);
        assert_eq!(value.get_path(&["missing"]), None);
        assert_eq!(value.get_path::<&str>(&[]), Some(&value));
    }
}
