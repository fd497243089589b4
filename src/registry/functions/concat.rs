//! concat() function - joins values into one string

use crate::registry::function::{FunctionContext, FunctionResult, RuntimeFunction};
use crate::registry::signature::FunctionSignature;
use crate::rich_text::EditorNode;
use crate::value_ext::ValueExt;
use serde_json::Value;
use std::sync::LazyLock;

/// concat(a, b, ...) function - joins the string forms of at least two values
pub struct ConcatFunction;

impl RuntimeFunction for ConcatFunction {
    fn name(&self) -> &str {
        "concat"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: LazyLock<FunctionSignature> =
            LazyLock::new(|| FunctionSignature::variadic("concat").with_min_arity(2));
        &SIG
    }

    fn documentation(&self) -> &str {
        "Joins its arguments into a single text. Null arguments contribute nothing."
    }

    fn execute(&self, _context: &FunctionContext<'_>, args: Vec<Value>) -> FunctionResult<Value> {
        let joined: String = args.iter().map(ValueExt::to_formula_string).collect();
        Ok(Value::String(joined))
    }

    // Concatenation is implicit in a document, so argument nodes are laid out in sequence.
    fn to_nodes(&self, args: Vec<Vec<EditorNode>>) -> Option<Vec<EditorNode>> {
        Some(args.into_iter().flatten().collect())
    }
}
