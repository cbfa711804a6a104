//! Storage trait definitions for the diagram storage backends.
//!
//! Every operation is scoped by the owner id. A diagram that exists but
//! belongs to another owner is reported exactly like a missing one.

use crate::models::{Diagram, Edge, Node};
use async_trait::async_trait;
use uuid::Uuid;

use super::StorageError;

/// Validated input for a new diagram.
#[derive(Debug, Clone)]
pub struct NewDiagram {
    pub title: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Top-level fields to overwrite. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct DiagramPatch {
    pub title: Option<String>,
    pub nodes: Option<Vec<Node>>,
    pub edges: Option<Vec<Edge>>,
}

impl DiagramPatch {
    /// Write the provided fields into `diagram` and refresh its timestamp.
    pub fn apply(self, diagram: &mut Diagram) {
        if let Some(title) = self.title {
            diagram.title = title;
        }
        if let Some(nodes) = self.nodes {
            diagram.nodes = nodes;
        }
        if let Some(edges) = self.edges {
            diagram.edges = edges;
        }
        diagram.touch();
    }
}

/// Storage backend trait for diagram documents
#[async_trait]
pub trait DiagramStorage: Send + Sync {
    /// Diagrams owned by `owner_id`, most recently updated first
    async fn list_diagrams(&self, owner_id: &str) -> Result<Vec<Diagram>, StorageError>;

    /// Get a diagram owned by `owner_id`
    async fn get_diagram(&self, owner_id: &str, id: Uuid) -> Result<Diagram, StorageError>;

    /// Create a diagram for `owner_id`; the backend assigns id and timestamps
    async fn create_diagram(
        &self,
        owner_id: &str,
        diagram: NewDiagram,
    ) -> Result<Diagram, StorageError>;

    /// Overwrite fields of a diagram owned by `owner_id`
    async fn update_diagram(
        &self,
        owner_id: &str,
        id: Uuid,
        patch: DiagramPatch,
    ) -> Result<Diagram, StorageError>;

    /// Delete a diagram owned by `owner_id`
    async fn delete_diagram(&self, owner_id: &str, id: Uuid) -> Result<(), StorageError>;
}

pub(crate) fn build_diagram(owner_id: &str, new: NewDiagram) -> Diagram {
    let mut diagram = Diagram::new(owner_id, new.title);
    diagram.nodes = new.nodes;
    diagram.edges = new.edges;
    diagram
}

pub(crate) fn sort_recent_first(diagrams: &mut [Diagram]) {
    diagrams.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
