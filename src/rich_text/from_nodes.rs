//! Editor nodes to formula source

use super::node::EditorNode;
use crate::parser::quote_string;
use crate::registry::FunctionRegistry;

/// Converts editor nodes into formula source
///
/// Sequences of two or more nodes become nested `concat` calls folded from
/// the left: `a b c` turns into `concat(concat(a, b), c)`.
pub struct FromNodesVisitor<'a> {
    registry: &'a FunctionRegistry,
}

impl<'a> FromNodesVisitor<'a> {
    /// Create a visitor resolving node types in `registry`
    pub fn new(registry: &'a FunctionRegistry) -> Self {
        Self { registry }
    }

    /// Convert a node sequence; an empty sequence is the empty formula
    pub fn visit(&self, nodes: &[EditorNode]) -> String {
        let mut parts = nodes.iter().filter_map(|node| self.visit_node(node));
        let Some(first) = parts.next() else {
            return String::new();
        };
        parts.fold(first, |acc, part| format!("concat({acc}, {part})"))
    }

    /// Convert a single node
    ///
    /// Returns `None` for node types no registered function claims.
    pub fn visit_node(&self, node: &EditorNode) -> Option<String> {
        if node.is_text() {
            return Some(self.visit_text(node));
        }
        if node.is_wrapper() {
            return Some(self.visit_wrapper(node));
        }
        self.visit_function(node)
    }

    fn visit_text(&self, node: &EditorNode) -> String {
        quote_string(node.text.as_deref().unwrap_or_default(), '\'')
    }

    fn visit_wrapper(&self, node: &EditorNode) -> String {
        if node.content.is_empty() {
            return quote_string("\n", '\'');
        }
        self.visit(&node.content)
    }

    fn visit_function(&self, node: &EditorNode) -> Option<String> {
        let function = self.registry.find_by_node_type(&node.node_type);
        if function.is_none() {
            log::debug!("No function handles editor node type '{}'", node.node_type);
        }
        function?.node_to_formula(node)
    }
}

/// Convert editor nodes into formula source
pub fn to_formula(nodes: &[EditorNode], registry: &FunctionRegistry) -> String {
    FromNodesVisitor::new(registry).visit(nodes)
}
