//! Diagram service - request validation on top of a storage backend.

use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::graph::find_dangling_edges;
use crate::models::{
    CreateDiagramRequest, Diagram, Edge, Node, UpdateDiagramRequest, normalize_title,
};
use crate::storage::{DiagramPatch, DiagramStorage, NewDiagram, StorageError};

#[derive(Error, Debug)]
pub enum DiagramServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("Diagram not found or you don't have access to it")]
    NotFound,
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for DiagramServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => DiagramServiceError::NotFound,
            other => DiagramServiceError::Storage(other),
        }
    }
}

#[derive(Clone)]
pub struct DiagramService {
    storage: Arc<dyn DiagramStorage>,
}

impl DiagramService {
    pub fn new(storage: Arc<dyn DiagramStorage>) -> Self {
        Self { storage }
    }

    pub async fn list(&self, owner_id: &str) -> Result<Vec<Diagram>, DiagramServiceError> {
        Ok(self.storage.list_diagrams(owner_id).await?)
    }

    pub async fn get(&self, owner_id: &str, id: Uuid) -> Result<Diagram, DiagramServiceError> {
        Ok(self.storage.get_diagram(owner_id, id).await?)
    }

    pub async fn create(
        &self,
        owner_id: &str,
        request: CreateDiagramRequest,
    ) -> Result<Diagram, DiagramServiceError> {
        let title = normalize_title(request.title.as_deref().unwrap_or_default())
            .map_err(|_| DiagramServiceError::Validation("Title is required".to_string()))?;
        let nodes = request.nodes.unwrap_or_default();
        let edges = request.edges.unwrap_or_default();
        validate_graph(&nodes, &edges)?;

        let diagram = self
            .storage
            .create_diagram(owner_id, NewDiagram { title, nodes, edges })
            .await?;
        info!("Created diagram {} for owner {}", diagram.id, owner_id);
        Ok(diagram)
    }

    pub async fn update(
        &self,
        owner_id: &str,
        id: Uuid,
        request: UpdateDiagramRequest,
    ) -> Result<Diagram, DiagramServiceError> {
        let title = request
            .title
            .as_deref()
            .map(normalize_title)
            .transpose()
            .map_err(|_| DiagramServiceError::Validation("Title cannot be empty".to_string()))?;

        // A partial write is checked against the stored half of the graph.
        if request.nodes.is_some() || request.edges.is_some() {
            let current = self.storage.get_diagram(owner_id, id).await?;
            let nodes = request.nodes.as_ref().unwrap_or(&current.nodes);
            let edges = request.edges.as_ref().unwrap_or(&current.edges);
            validate_graph(nodes, edges)?;
        }

        let patch = DiagramPatch {
            title,
            nodes: request.nodes,
            edges: request.edges,
        };
        Ok(self.storage.update_diagram(owner_id, id, patch).await?)
    }

    pub async fn delete(&self, owner_id: &str, id: Uuid) -> Result<(), DiagramServiceError> {
        self.storage.delete_diagram(owner_id, id).await?;
        info!("Deleted diagram {} for owner {}", id, owner_id);
        Ok(())
    }
}

/// Node and edge ids must be unique and every edge must reference existing
/// nodes.
pub fn validate_graph(nodes: &[Node], edges: &[Edge]) -> Result<(), DiagramServiceError> {
    let mut seen = HashSet::new();
    if let Some(dup) = nodes.iter().find(|n| !seen.insert(n.id.as_str())) {
        return Err(DiagramServiceError::Validation(format!(
            "Duplicate node id: {}",
            dup.id
        )));
    }

    let mut seen = HashSet::new();
    if let Some(dup) = edges.iter().find(|e| !seen.insert(e.id.as_str())) {
        return Err(DiagramServiceError::Validation(format!(
            "Duplicate edge id: {}",
            dup.id
        )));
    }

    if let Some(edge) = find_dangling_edges(nodes, edges).first() {
        warn!("Rejecting edge {} with unknown endpoint", edge.id);
        return Err(DiagramServiceError::Validation(format!(
            "Edge {} references an unknown node",
            edge.id
        )));
    }
    Ok(())
}
