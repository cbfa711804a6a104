//! Diagram aggregate and its request payloads.
//!
//! A diagram belongs to exactly one owner and carries the full node/edge
//! snapshot of the canvas. Writes always replace whole sequences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::{Edge, Node};

/// Minimum length of a user-supplied title at creation time.
pub const MIN_TITLE_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Diagram {
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            title: title.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            metadata: Map::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }

    /// Refresh `updated_at`, never moving it backwards.
    pub fn touch(&mut self) {
        let now = Utc::now();
        if now > self.updated_at {
            self.updated_at = now;
        } else {
            self.updated_at += chrono::Duration::microseconds(1);
        }
    }
}

/// Body of `POST /diagrams`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateDiagramRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<Edge>>,
}

impl CreateDiagramRequest {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// Body of `PUT /diagrams/{id}`. Omitted fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateDiagramRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<Edge>>,
}

impl UpdateDiagramRequest {
    /// Full graph snapshot, title untouched.
    pub fn snapshot(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            title: None,
            nodes: Some(nodes),
            edges: Some(edges),
        }
    }
}

/// Payload returned by `DELETE /diagrams/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeletedDiagram {
    pub id: Uuid,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TitleError {
    #[error("Project title is required")]
    Empty,
    #[error("Project title must be at least {min} characters long")]
    TooShort { min: usize },
}

/// Trim a title and require it to be non-blank.
pub fn normalize_title(raw: &str) -> Result<String, TitleError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(TitleError::Empty);
    }
    Ok(title.to_string())
}

/// Rule applied to titles typed by the user when creating a diagram.
pub fn validate_new_title(raw: &str) -> Result<String, TitleError> {
    let title = normalize_title(raw)?;
    if title.chars().count() < MIN_TITLE_LEN {
        return Err(TitleError::TooShort { min: MIN_TITLE_LEN });
    }
    Ok(title)
}
