//! Canvas interaction layer.
//!
//! Turns pointer and keyboard gestures into [`Graph`] mutations and owns the
//! transient UI state between them: the label being edited and the pending
//! connection drag. Palette items travel to the canvas as a type tag in the
//! drag-data channel and are only read on drop.

pub mod editing;

use crate::graph::Graph;
use crate::models::{Edge, EdgeAttrs, Node, NodeType, Position};
use std::collections::HashMap;
use tracing::debug;

pub use editing::{EditKey, EditState, LabelEditor};

/// Drag-data key under which palette items carry their node type tag.
pub const DRAG_DATA_KEY: &str = "application/reactflow";

/// Entry of the shape palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteItem {
    pub node_type: NodeType,
    pub label: &'static str,
    pub icon: &'static str,
}

pub const PALETTE: [PaletteItem; 4] = [
    PaletteItem {
        node_type: NodeType::Rectangle,
        label: "Rectangle",
        icon: "⬜",
    },
    PaletteItem {
        node_type: NodeType::Circle,
        label: "Circle",
        icon: "⚪",
    },
    PaletteItem {
        node_type: NodeType::Diamond,
        label: "Diamond",
        icon: "♦️",
    },
    PaletteItem {
        node_type: NodeType::Text,
        label: "Text Box",
        icon: "📝",
    },
];

/// Platform drag-data transfer: string payloads keyed by MIME type.
#[derive(Debug, Clone, Default)]
pub struct DataTransfer {
    entries: HashMap<String, String>,
}

impl DataTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data(&mut self, format: &str, data: impl Into<String>) {
        self.entries.insert(format.to_string(), data.into());
    }

    pub fn get_data(&self, format: &str) -> Option<&str> {
        self.entries.get(format).map(String::as_str)
    }
}

/// Canvas viewport origin in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasBounds {
    pub left: f64,
    pub top: f64,
}

impl CanvasBounds {
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }

    /// Convert client coordinates to canvas coordinates.
    pub fn to_canvas(&self, client: Position) -> Position {
        Position::new(client.x - self.left, client.y - self.top)
    }
}

/// Gesture handler for one canvas.
#[derive(Debug, Default)]
pub struct CanvasController {
    editor: LabelEditor,
    pending_connection: Option<String>,
}

impl CanvasController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editor(&self) -> &LabelEditor {
        &self.editor
    }

    pub fn pending_connection(&self) -> Option<&str> {
        self.pending_connection.as_deref()
    }

    /// Palette drag start: put the type tag on the transfer.
    pub fn start_palette_drag(item: &PaletteItem, transfer: &mut DataTransfer) {
        transfer.set_data(DRAG_DATA_KEY, item.node_type.as_str());
    }

    /// Drop on the canvas. Creates a node at the pointer position when the
    /// transfer carries a known type tag; anything else is ignored.
    pub fn drop(
        &mut self,
        graph: &mut Graph,
        transfer: &DataTransfer,
        client: Position,
        bounds: CanvasBounds,
    ) -> Option<Node> {
        let tag = transfer.get_data(DRAG_DATA_KEY)?;
        let Some(node_type) = NodeType::from_tag(tag) else {
            debug!("Ignoring drop with unknown type tag {:?}", tag);
            return None;
        };
        Some(graph.add_node(node_type, bounds.to_canvas(client)))
    }

    /// Node dragged to a new canvas position.
    pub fn drag_node(&mut self, graph: &mut Graph, node_id: &str, position: Position) {
        graph.move_node(node_id, position);
    }

    /// Pointer down on a node's output handle.
    pub fn begin_connection(&mut self, graph: &Graph, source_id: &str) {
        self.pending_connection = graph.contains_node(source_id).then(|| source_id.to_string());
    }

    /// Pointer released over `target` (a node's input handle) or over empty
    /// canvas (`None`). Empty canvas is a no-op.
    pub fn finish_connection(&mut self, graph: &mut Graph, target: Option<&str>) -> Option<Edge> {
        let source = self.pending_connection.take()?;
        let target = target?;
        graph.connect(&source, target, EdgeAttrs::default())
    }

    pub fn cancel_connection(&mut self) {
        self.pending_connection = None;
    }

    pub fn double_click(&mut self, graph: &mut Graph, node_id: &str) -> bool {
        self.editor.begin(graph, node_id)
    }

    pub fn label_input(&mut self, text: impl Into<String>) {
        self.editor.input(text);
    }

    pub fn key(&mut self, graph: &mut Graph, key: EditKey) {
        self.editor.key(graph, key);
    }

    pub fn blur(&mut self, graph: &mut Graph) {
        self.editor.blur(graph);
    }

    pub fn display_label(&self, graph: &Graph, node_id: &str) -> Option<String> {
        self.editor.display_label(graph, node_id)
    }

    /// Drop all transient state, e.g. when another diagram is opened.
    pub fn reset(&mut self) {
        self.editor.cancel();
        self.pending_connection = None;
    }
}
