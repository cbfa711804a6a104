//! Storage error types for the diagram storage backends.

use thiserror::Error;

/// Storage operation errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Entity not found, or owned by someone else
    #[error("Entity not found: {entity_type} with id {entity_id}")]
    NotFound {
        entity_type: String,
        entity_id: String,
    },
    /// Reading or writing the backing files failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    pub fn diagram_not_found(id: uuid::Uuid) -> Self {
        StorageError::NotFound {
            entity_type: "diagram".to_string(),
            entity_id: id.to_string(),
        }
    }
}
