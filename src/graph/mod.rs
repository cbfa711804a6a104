//! In-session diagram graph.
//!
//! Holds the ordered node and edge sequences of the open diagram. Node order is
//! render order. Mutations never fail: operations naming an unknown id are
//! silent no-ops, because gesture events can race with deletion.
//!
//! Every mutation that changes state bumps [`Graph::revision`] and records a
//! [`GraphChange`]. Observers drain the change log with [`Graph::take_changes`].

use crate::models::{Edge, EdgeAttrs, Node, NodeType, Position};
use std::collections::HashSet;
use tracing::{debug, warn};
use uuid::Uuid;

/// A single recorded mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphChange {
    NodeAdded(String),
    NodeMoved(String),
    NodeRelabeled(String),
    NodeRemoved {
        id: String,
        cascaded_edges: Vec<String>,
    },
    EdgeAdded(String),
    EdgeRemoved(String),
    /// Bulk replacement of both sequences (session load).
    Replaced { nodes: usize, edges: usize },
}

impl GraphChange {
    pub fn is_bulk_replace(&self) -> bool {
        matches!(self, GraphChange::Replaced { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    revision: u64,
    changes: Vec<GraphChange>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Edges that use `node_id` as source or target.
    pub fn edges_for(&self, node_id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.touches(node_id)).collect()
    }

    /// Monotonic counter bumped by every state-changing mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Owned copy of both sequences, as sent to the store.
    pub fn snapshot(&self) -> (Vec<Node>, Vec<Edge>) {
        (self.nodes.clone(), self.edges.clone())
    }

    /// Drain the change log.
    pub fn take_changes(&mut self) -> Vec<GraphChange> {
        std::mem::take(&mut self.changes)
    }

    /// Append a new node of `node_type` at `position` with its default label.
    pub fn add_node(&mut self, node_type: NodeType, position: Position) -> Node {
        let id = self.fresh_id("node");
        let node = Node::new(id.clone(), node_type, position);
        self.nodes.push(node.clone());
        self.record(GraphChange::NodeAdded(id));
        node
    }

    pub fn move_node(&mut self, id: &str, position: Position) {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            debug!("move_node ignored, unknown node {}", id);
            return;
        };
        if node.position == position {
            return;
        }
        node.position = position;
        self.record(GraphChange::NodeMoved(id.to_string()));
    }

    /// Replace a node's label. Empty labels are allowed.
    pub fn relabel_node(&mut self, id: &str, label: impl Into<String>) {
        let label = label.into();
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            debug!("relabel_node ignored, unknown node {}", id);
            return;
        };
        if node.data.label == label {
            return;
        }
        node.data.label = label;
        self.record(GraphChange::NodeRelabeled(id.to_string()));
    }

    /// Connect two existing nodes. Returns `None` and leaves the graph
    /// untouched when either endpoint is unknown. Self-loops are allowed.
    pub fn connect(&mut self, source: &str, target: &str, attrs: EdgeAttrs) -> Option<Edge> {
        if !self.contains_node(source) || !self.contains_node(target) {
            debug!("connect rejected, unknown endpoint {} -> {}", source, target);
            return None;
        }
        let id = self.fresh_id("edge");
        let edge = Edge {
            id: id.clone(),
            source: source.to_string(),
            target: target.to_string(),
            edge_type: attrs.edge_type,
            animated: attrs.animated,
        };
        self.edges.push(edge.clone());
        self.record(GraphChange::EdgeAdded(id));
        Some(edge)
    }

    /// Remove a node together with every edge that references it.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(index);

        let mut cascaded_edges = Vec::new();
        self.edges.retain(|e| {
            if e.touches(id) {
                cascaded_edges.push(e.id.clone());
                false
            } else {
                true
            }
        });

        self.record(GraphChange::NodeRemoved {
            id: id.to_string(),
            cascaded_edges,
        });
        Some(node)
    }

    pub fn remove_edge(&mut self, id: &str) -> Option<Edge> {
        let index = self.edges.iter().position(|e| e.id == id)?;
        let edge = self.edges.remove(index);
        self.record(GraphChange::EdgeRemoved(id.to_string()));
        Some(edge)
    }

    /// Replace both sequences at once. Used only when loading a session.
    ///
    /// Edges whose endpoints are not in `nodes` are dropped.
    pub fn replace_all(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        let total_edges = edges.len();
        let edges = retain_attached(&nodes, edges);
        if edges.len() != total_edges {
            warn!(
                "Dropped {} dangling edge(s) while replacing graph",
                total_edges - edges.len()
            );
        }

        self.nodes = nodes;
        self.edges = edges;
        self.record(GraphChange::Replaced {
            nodes: self.nodes.len(),
            edges: self.edges.len(),
        });
    }

    fn record(&mut self, change: GraphChange) {
        self.revision += 1;
        self.changes.push(change);
    }

    fn fresh_id(&self, prefix: &str) -> String {
        loop {
            let id = format!("{}_{}", prefix, Uuid::new_v4().simple());
            let taken = self.nodes.iter().any(|n| n.id == id) || self.edges.iter().any(|e| e.id == id);
            if !taken {
                return id;
            }
        }
    }
}

/// Edges whose source or target is not among `nodes`.
pub fn find_dangling_edges<'a>(nodes: &[Node], edges: &'a [Edge]) -> Vec<&'a Edge> {
    let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    edges
        .iter()
        .filter(|e| !ids.contains(e.source.as_str()) || !ids.contains(e.target.as_str()))
        .collect()
}

fn retain_attached(nodes: &[Node], edges: Vec<Edge>) -> Vec<Edge> {
    let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    edges
        .into_iter()
        .filter(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
        .collect()
}
