//! In-memory storage backend.
//!
//! Used when no data directory is configured, and by tests.

use super::traits::{build_diagram, sort_recent_first};
use super::{DiagramPatch, DiagramStorage, NewDiagram, StorageError};
use crate::models::Diagram;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStorage {
    diagrams: RwLock<HashMap<Uuid, Diagram>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DiagramStorage for MemoryStorage {
    async fn list_diagrams(&self, owner_id: &str) -> Result<Vec<Diagram>, StorageError> {
        let diagrams = self.diagrams.read().await;
        let mut owned: Vec<Diagram> = diagrams
            .values()
            .filter(|d| d.is_owned_by(owner_id))
            .cloned()
            .collect();
        sort_recent_first(&mut owned);
        Ok(owned)
    }

    async fn get_diagram(&self, owner_id: &str, id: Uuid) -> Result<Diagram, StorageError> {
        let diagrams = self.diagrams.read().await;
        diagrams
            .get(&id)
            .filter(|d| d.is_owned_by(owner_id))
            .cloned()
            .ok_or_else(|| StorageError::diagram_not_found(id))
    }

    async fn create_diagram(
        &self,
        owner_id: &str,
        diagram: NewDiagram,
    ) -> Result<Diagram, StorageError> {
        let diagram = build_diagram(owner_id, diagram);
        self.diagrams
            .write()
            .await
            .insert(diagram.id, diagram.clone());
        Ok(diagram)
    }

    async fn update_diagram(
        &self,
        owner_id: &str,
        id: Uuid,
        patch: DiagramPatch,
    ) -> Result<Diagram, StorageError> {
        let mut diagrams = self.diagrams.write().await;
        let diagram = diagrams
            .get_mut(&id)
            .filter(|d| d.is_owned_by(owner_id))
            .ok_or_else(|| StorageError::diagram_not_found(id))?;
        patch.apply(diagram);
        Ok(diagram.clone())
    }

    async fn delete_diagram(&self, owner_id: &str, id: Uuid) -> Result<(), StorageError> {
        let mut diagrams = self.diagrams.write().await;
        match diagrams.get(&id) {
            Some(d) if d.is_owned_by(owner_id) => {
                diagrams.remove(&id);
                Ok(())
            }
            _ => Err(StorageError::diagram_not_found(id)),
        }
    }
}
