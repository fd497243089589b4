//! Rich-text editor document nodes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Node type of plain text runs
pub const TEXT_NODE_TYPE: &str = "text";

/// Node type of paragraph-like containers
pub const WRAPPER_NODE_TYPE: &str = "wrapper";

/// A node of an editor document
///
/// Serializes to the usual editor JSON shape:
/// `{"type": "text", "text": "..."}` or `{"type": "...", "attrs": {...}, "content": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorNode {
    /// Node type
    #[serde(rename = "type")]
    pub node_type: String,
    /// Text of a text node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Node attributes
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attrs: Map<String, Value>,
    /// Child nodes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<EditorNode>,
}

impl EditorNode {
    /// Create a node of the given type without text or children
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            text: None,
            attrs: Map::new(),
            content: Vec::new(),
        }
    }

    /// Create a text node
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(TEXT_NODE_TYPE)
        }
    }

    /// Create a wrapper node around `content`
    pub fn wrapper(content: Vec<EditorNode>) -> Self {
        Self {
            content,
            ..Self::new(WRAPPER_NODE_TYPE)
        }
    }

    /// Create a formula component node with a fresh `id` attribute
    pub fn component(node_type: impl Into<String>) -> Self {
        Self::new(node_type).with_attr("id", Value::String(uuid::Uuid::new_v4().to_string()))
    }

    /// Set an attribute
    pub fn with_attr(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }

    /// String attribute by key
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(Value::as_str)
    }

    /// Whether this is a text node
    pub fn is_text(&self) -> bool {
        self.node_type == TEXT_NODE_TYPE
    }

    /// Whether this is a wrapper node
    pub fn is_wrapper(&self) -> bool {
        self.node_type == WRAPPER_NODE_TYPE
    }
}
