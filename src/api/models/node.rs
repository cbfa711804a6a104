//! Diagram node model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Shape of a node on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Rectangle,
    Circle,
    Diamond,
    /// Free text box. Older clients send the tag `textNode`.
    #[serde(alias = "textNode")]
    Text,
}

impl NodeType {
    pub const ALL: [NodeType; 4] = [
        NodeType::Rectangle,
        NodeType::Circle,
        NodeType::Diamond,
        NodeType::Text,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Rectangle => "rectangle",
            NodeType::Circle => "circle",
            NodeType::Diamond => "diamond",
            NodeType::Text => "text",
        }
    }

    /// Parse a palette/drag tag. Unknown or empty tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "rectangle" => Some(NodeType::Rectangle),
            "circle" => Some(NodeType::Circle),
            "diamond" => Some(NodeType::Diamond),
            "text" | "textNode" => Some(NodeType::Text),
            _ => None,
        }
    }

    /// Label given to freshly created nodes of this type.
    pub fn default_label(&self) -> String {
        format!("{} node", self.as_str())
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Node payload. Keys other than `label` are carried through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeData {
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
}

impl Node {
    pub fn new(id: impl Into<String>, node_type: NodeType, position: Position) -> Self {
        Self {
            id: id.into(),
            node_type,
            position,
            data: NodeData::with_label(node_type.default_label()),
        }
    }

    pub fn label(&self) -> &str {
        &self.data.label
    }
}
