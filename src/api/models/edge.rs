use serde::{Deserialize, Serialize};

/// Directed connection between two node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
}

impl Edge {
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Optional presentation attributes supplied when connecting two nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeAttrs {
    pub edge_type: Option<String>,
    pub animated: Option<bool>,
}
