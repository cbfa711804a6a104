//! File-based storage backend.
//!
//! Each diagram is one pretty-printed JSON document named `<id>.json` inside
//! the data directory. Writes go to a temporary file first and are renamed
//! into place.

use super::traits::{build_diagram, sort_recent_first};
use super::{DiagramPatch, DiagramStorage, NewDiagram, StorageError};
use crate::models::Diagram;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct FileStorage {
    root: PathBuf,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Open (creating if needed) a data directory.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        debug!("File storage rooted at {}", root.display());
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    async fn read(&self, id: Uuid) -> Result<Option<Diagram>, StorageError> {
        match read_if_present(&self.path_for(id)).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn read_owned(&self, owner_id: &str, id: Uuid) -> Result<Diagram, StorageError> {
        self.read(id)
            .await?
            .filter(|d| d.is_owned_by(owner_id))
            .ok_or_else(|| StorageError::diagram_not_found(id))
    }

    async fn write(&self, diagram: &Diagram) -> Result<(), StorageError> {
        let path = self.path_for(diagram.id);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_vec_pretty(diagram)?;
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

async fn read_if_present(path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl DiagramStorage for FileStorage {
    async fn list_diagrams(&self, owner_id: &str) -> Result<Vec<Diagram>, StorageError> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut owned = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            // Deleted between listing and reading.
            let Some(bytes) = read_if_present(&path).await? else {
                continue;
            };
            match serde_json::from_slice::<Diagram>(&bytes) {
                Ok(diagram) if diagram.is_owned_by(owner_id) => owned.push(diagram),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable diagram file {}: {}", path.display(), e),
            }
        }

        sort_recent_first(&mut owned);
        Ok(owned)
    }

    async fn get_diagram(&self, owner_id: &str, id: Uuid) -> Result<Diagram, StorageError> {
        self.read_owned(owner_id, id).await
    }

    async fn create_diagram(
        &self,
        owner_id: &str,
        diagram: NewDiagram,
    ) -> Result<Diagram, StorageError> {
        let diagram = build_diagram(owner_id, diagram);
        let _guard = self.write_lock.lock().await;
        self.write(&diagram).await?;
        Ok(diagram)
    }

    async fn update_diagram(
        &self,
        owner_id: &str,
        id: Uuid,
        patch: DiagramPatch,
    ) -> Result<Diagram, StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut diagram = self.read_owned(owner_id, id).await?;
        patch.apply(&mut diagram);
        self.write(&diagram).await?;
        Ok(diagram)
    }

    async fn delete_diagram(&self, owner_id: &str, id: Uuid) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.read_owned(owner_id, id).await?;
        fs::remove_file(self.path_for(id)).await?;
        Ok(())
    }
}
