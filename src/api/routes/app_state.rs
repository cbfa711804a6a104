//! Application state management.
//!
//! Defines the AppState struct shared by every route handler: the diagram
//! service over the configured storage backend, the JWT service, the server
//! configuration and the rate limiter.

use std::sync::Arc;
use tracing::info;

use crate::config::ServerConfig;
use crate::middleware::{RateLimiterState, create_rate_limiter_with_quota};
use crate::services::{DiagramService, JwtService, SharedJwtService};
use crate::storage::{DiagramStorage, FileStorage, MemoryStorage, StorageError};

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub diagrams: DiagramService,
    pub jwt: SharedJwtService,
    pub config: Arc<ServerConfig>,
    pub rate_limiter: RateLimiterState,
}

impl AppState {
    /// Build state over an existing storage backend.
    pub fn with_storage(config: ServerConfig, storage: Arc<dyn DiagramStorage>) -> Self {
        Self {
            diagrams: DiagramService::new(storage),
            jwt: Arc::new(JwtService::new(&config.jwt_secret)),
            rate_limiter: create_rate_limiter_with_quota(config.rate_limit_per_minute),
            config: Arc::new(config),
        }
    }

    /// Initialize the storage backend from configuration.
    ///
    /// Uses file storage under `DIAGRAM_DATA_DIR` when set, otherwise keeps
    /// diagrams in memory.
    pub async fn from_config(config: ServerConfig) -> Result<Self, StorageError> {
        let storage: Arc<dyn DiagramStorage> = match &config.data_dir {
            Some(dir) => {
                info!("Using file storage in {}", dir.display());
                Arc::new(FileStorage::open(dir).await?)
            }
            None => {
                info!("DIAGRAM_DATA_DIR not set, using in-memory storage");
                Arc::new(MemoryStorage::new())
            }
        };
        Ok(Self::with_storage(config, storage))
    }
}
