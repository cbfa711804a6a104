//! Diagram synchronization.
//!
//! The [`SyncEngine`] binds one open diagram to the remote store: it loads the
//! diagram into the [`Graph`](crate::graph::Graph), watches user edits, and
//! writes the whole graph back after a quiet period.

pub mod engine;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::client::ClientError;

pub use engine::SyncEngine;

/// Save state of the open diagram as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Saving,
    Unsaved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Loading { diagram_id: Uuid },
    Editing { diagram_id: Uuid, status: SaveStatus },
    /// A save was refused for lack of access. Edits and saves stay blocked
    /// until the diagram is opened again.
    Restricted { diagram_id: Uuid },
}

impl SyncState {
    pub fn diagram_id(&self) -> Option<Uuid> {
        match self {
            SyncState::Idle => None,
            SyncState::Loading { diagram_id }
            | SyncState::Editing { diagram_id, .. }
            | SyncState::Restricted { diagram_id } => Some(*diagram_id),
        }
    }

    pub fn status(&self) -> Option<SaveStatus> {
        match self {
            SyncState::Editing { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// How a store failure should be handled by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Rejected input; nothing was sent or the server refused it.
    Validation,
    /// Credential missing or rejected; block access, do not retry.
    Auth,
    /// Diagram absent or owned by someone else; go back to the list.
    NotFoundOrForbidden,
    /// Transport failure; keep local state and allow a manual retry.
    Network,
    /// Unexpected server response; handled like `Network`.
    Server,
}

impl From<&ClientError> for ErrorClass {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Validation(_) => ErrorClass::Validation,
            ClientError::Auth(_) => ErrorClass::Auth,
            ClientError::NotFoundOrForbidden => ErrorClass::NotFoundOrForbidden,
            ClientError::Network(_) => ErrorClass::Network,
            ClientError::Server { .. } => ErrorClass::Server,
        }
    }
}

/// Transitions reported by [`SyncEngine::next_event`].
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Loaded {
        diagram_id: Uuid,
        title: String,
    },
    LoadFailed {
        diagram_id: Uuid,
        error: ClientError,
    },
    /// The diagram is gone or not ours; the UI should show the diagram list.
    RedirectToList {
        diagram_id: Uuid,
    },
    /// The credential was rejected; the UI should block editing.
    AccessRestricted,
    SaveStarted {
        diagram_id: Uuid,
    },
    Saved {
        diagram_id: Uuid,
        updated_at: DateTime<Utc>,
    },
    SaveFailed {
        diagram_id: Uuid,
        error: ClientError,
    },
}
