//! Expression tree to editor nodes

use super::node::EditorNode;
use super::{BridgeError, BridgeResult};
use crate::ast::{ExpressionNode, LiteralValue, Visitor};
use crate::registry::FunctionRegistry;

/// Converts expression trees into editor nodes
pub struct ToNodesVisitor<'a> {
    registry: &'a FunctionRegistry,
}

impl<'a> ToNodesVisitor<'a> {
    /// Create a visitor resolving functions in `registry`
    pub fn new(registry: &'a FunctionRegistry) -> Self {
        Self { registry }
    }
}

impl Visitor for ToNodesVisitor<'_> {
    type Result = BridgeResult<Vec<EditorNode>>;

    fn visit_literal(&mut self, literal: &LiteralValue) -> Self::Result {
        let text = literal.display_text();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![EditorNode::text(text)])
    }

    fn visit_function_call(&mut self, name: &str, args: &[ExpressionNode]) -> Self::Result {
        let function = self
            .registry
            .get(name)
            .ok_or_else(|| BridgeError::UnknownFunction {
                name: name.to_string(),
            })?;

        let children = args
            .iter()
            .map(|arg| self.visit_expression(arg))
            .collect::<BridgeResult<Vec<_>>>()?;

        function
            .to_nodes(children)
            .ok_or_else(|| BridgeError::UnsupportedFunction {
                name: name.to_string(),
            })
    }
}

/// Convert an expression tree into editor nodes
///
/// Editor text carries no type, so number and boolean literals become text
/// nodes holding their source text and convert back as string literals:
/// `concat(12, true)` returns as `concat('12', 'true')`.
pub fn to_nodes(expression: &ExpressionNode, registry: &FunctionRegistry) -> BridgeResult<Vec<EditorNode>> {
    ToNodesVisitor::new(registry).visit_expression(expression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::registry::create_standard_registry;
    use crate::registry::functions::GET_NODE_TYPE;
    use crate::rich_text::to_formula;

    fn convert(source: &str) -> BridgeResult<Vec<EditorNode>> {
        let expression = parse(source).expect("valid formula");
        to_nodes(&expression, &create_standard_registry())
    }

    #[test]
    fn test_literal_becomes_text() {
        let nodes = convert("'hello'").expect("convertible");
        assert_eq!(nodes, vec![EditorNode::text("hello")]);
        assert!(convert("''").expect("convertible").is_empty());
        assert_eq!(convert("12").expect("convertible"), vec![EditorNode::text("12")]);
    }

    #[test]
    fn test_typed_literals_return_as_strings() {
        let registry = create_standard_registry();
        let nodes = convert("concat(12, true, 2.5)").expect("convertible");
        assert_eq!(
            nodes,
            vec![EditorNode::text("12"), EditorNode::text("true"), EditorNode::text("2.5")]
        );
        assert_eq!(
            to_formula(&nodes, &registry),
            "concat(concat('12', 'true'), '2.5')"
        );
    }

    #[test]
    fn test_nested_concat_is_flattened() {
        let nodes = convert("concat(concat('a', get('data_source.x')), 'b')").expect("convertible");
        let types: Vec<_> = nodes.iter().map(|n| n.node_type.as_str()).collect();
        assert_eq!(types, vec!["text", GET_NODE_TYPE, "text"]);
        assert_eq!(nodes[1].attr_str("path"), Some("data_source.x"));
    }

    #[test]
    fn test_unsupported_functions() {
        assert_eq!(
            convert("add(1, 2)"),
            Err(BridgeError::UnsupportedFunction {
                name: "add".to_string()
            })
        );
        assert_eq!(
            convert("upper('a')"),
            Err(BridgeError::UnknownFunction {
                name: "upper".to_string()
            })
        );
    }
}
