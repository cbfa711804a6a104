//! Inline label editing.
//!
//! `Idle -> Editing` on double-click, back to `Idle` on Enter, blur or Escape.
//! Enter and blur commit the draft; Escape throws it away.

use crate::graph::Graph;

/// Keys the label editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Enter,
    Escape,
    Other,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditState {
    #[default]
    Idle,
    Editing {
        node_id: String,
        draft: String,
    },
}

/// Label editor shared by every node on the canvas. At most one node edits
/// at a time.
#[derive(Debug, Default)]
pub struct LabelEditor {
    state: EditState,
}

impl LabelEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn editing_node(&self) -> Option<&str> {
        match &self.state {
            EditState::Editing { node_id, .. } => Some(node_id),
            EditState::Idle => None,
        }
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.state {
            EditState::Editing { draft, .. } => Some(draft),
            EditState::Idle => None,
        }
    }

    /// Start editing `node_id`, seeding the draft with its committed label.
    /// A node already in edit mode is committed first.
    pub fn begin(&mut self, graph: &mut Graph, node_id: &str) -> bool {
        if self.editing_node() == Some(node_id) {
            return true;
        }
        self.commit(graph);

        let Some(node) = graph.node(node_id) else {
            return false;
        };
        self.state = EditState::Editing {
            node_id: node_id.to_string(),
            draft: node.data.label.clone(),
        };
        true
    }

    /// Replace the draft text (input change event).
    pub fn input(&mut self, text: impl Into<String>) {
        if let EditState::Editing { draft, .. } = &mut self.state {
            *draft = text.into();
        }
    }

    pub fn key(&mut self, graph: &mut Graph, key: EditKey) {
        match key {
            EditKey::Enter => self.commit(graph),
            EditKey::Escape => self.cancel(),
            EditKey::Other => {}
        }
    }

    pub fn blur(&mut self, graph: &mut Graph) {
        self.commit(graph);
    }

    /// Write the draft to the graph and leave edit mode.
    pub fn commit(&mut self, graph: &mut Graph) {
        if let EditState::Editing { node_id, draft } = std::mem::take(&mut self.state) {
            graph.relabel_node(&node_id, draft);
        }
    }

    /// Leave edit mode without touching the graph.
    pub fn cancel(&mut self) {
        self.state = EditState::Idle;
    }

    /// Label to display for `node_id`: the draft while editing, otherwise the
    /// committed label.
    pub fn display_label(&self, graph: &Graph, node_id: &str) -> Option<String> {
        match &self.state {
            EditState::Editing { node_id: id, draft } if id == node_id => Some(draft.clone()),
            _ => graph.node(node_id).map(|n| n.data.label.clone()),
        }
    }
}
