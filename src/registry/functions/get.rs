//! get() function - reads a value from the data ledger

use crate::parser::quote_string;
use crate::registry::function::{FunctionContext, FunctionResult, RuntimeFunction};
use crate::registry::signature::{ArgumentType, FunctionSignature, ParameterInfo};
use crate::rich_text::EditorNode;
use serde_json::Value;
use std::sync::LazyLock;

/// Rich-text node type representing a `get` call
pub const GET_NODE_TYPE: &str = "get-formula-component";

/// get(path) function - resolves a dotted path such as `data_source.rows.0.name`
///
/// Paths that cannot be resolved produce `null`.
pub struct GetFunction;

impl RuntimeFunction for GetFunction {
    fn name(&self) -> &str {
        "get"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: LazyLock<FunctionSignature> = LazyLock::new(|| {
            FunctionSignature::new("get", vec![ParameterInfo::new("path", ArgumentType::Text)])
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "Returns the value found at the given data path, or null when nothing is there."
    }

    fn execute(&self, context: &FunctionContext<'_>, args: Vec<Value>) -> FunctionResult<Value> {
        let Some(Value::String(path)) = args.first() else {
            return Ok(Value::Null);
        };
        Ok(context.lookup(path).unwrap_or(Value::Null))
    }

    fn editor_node_type(&self) -> Option<&str> {
        Some(GET_NODE_TYPE)
    }

    fn to_nodes(&self, args: Vec<Vec<EditorNode>>) -> Option<Vec<EditorNode>> {
        let path = args
            .first()
            .and_then(|nodes| nodes.first())
            .and_then(|node| node.text.clone())
            .unwrap_or_default();
        Some(vec![
            EditorNode::component(GET_NODE_TYPE).with_attr("path", Value::String(path)),
        ])
    }

    fn node_to_formula(&self, node: &EditorNode) -> Option<String> {
        let path = node.attr_str("path").unwrap_or_default();
        Some(format!("get({})", quote_string(path, '\'')))
    }
}
