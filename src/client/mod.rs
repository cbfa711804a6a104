//! Diagram store client.
//!
//! Typed access to the remote diagram store over its JSON wire contract.
//! Each call fetches a fresh bearer token from the session's
//! [`TokenProvider`]; there is no shared global client.

pub mod auth;
pub mod error;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::models::{
    ApiEnvelope, CreateDiagramRequest, DeletedDiagram, Diagram, UpdateDiagramRequest,
    normalize_title,
};

pub use auth::{StaticToken, TokenProvider};
pub use error::ClientError;

/// Operations the sync engine needs from a diagram store. The owner is the
/// caller identified by the credential.
#[async_trait]
pub trait DiagramApi: Send + Sync {
    /// Caller's diagrams, most recently modified first.
    async fn list(&self) -> Result<Vec<Diagram>, ClientError>;

    async fn get(&self, id: Uuid) -> Result<Diagram, ClientError>;

    async fn create(&self, request: CreateDiagramRequest) -> Result<Diagram, ClientError>;

    /// Overwrite the provided top-level fields.
    async fn update(&self, id: Uuid, request: UpdateDiagramRequest)
    -> Result<Diagram, ClientError>;

    /// Permanently delete, returning the removed id.
    async fn delete(&self, id: Uuid) -> Result<Uuid, ClientError>;
}

/// HTTP implementation of [`DiagramApi`].
#[derive(Clone)]
pub struct DiagramStoreClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl DiagramStoreClient {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiEnvelope<T>, ClientError> {
        let token = self.tokens.get_token().await?;
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self.http.request(method.clone(), &url).bearer_auth(token);
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await.map_err(|e| {
            error!("{} {} failed: {}", method, url, e);
            ClientError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!("Reading response of {} {} failed: {}", method, url, e);
            ClientError::from(e)
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiEnvelope<Value>>(&text)
                .ok()
                .and_then(|env| env.message)
                .unwrap_or_else(|| default_message(status));
            warn!("{} {} returned {}: {}", method, url, status, message);
            return Err(ClientError::from_status(status.as_u16(), message));
        }

        let envelope: ApiEnvelope<T> = serde_json::from_str(&text).map_err(|e| {
            error!("Malformed response from {} {}: {}", method, url, e);
            ClientError::Server {
                status: status.as_u16(),
                message: format!("Malformed response: {e}"),
            }
        })?;

        if !envelope.success {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "Request was not successful".to_string()),
            });
        }
        Ok(envelope)
    }

    async fn request_data<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        self.request::<T>(method, path, body)
            .await?
            .data
            .ok_or_else(|| ClientError::Server {
                status: StatusCode::OK.as_u16(),
                message: "Response is missing data".to_string(),
            })
    }
}

fn default_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("An error occurred")
        .to_string()
}

fn to_body<T: serde::Serialize>(value: &T) -> Result<Value, ClientError> {
    serde_json::to_value(value)
        .map_err(|e| ClientError::Validation(format!("Failed to encode request: {e}")))
}

#[async_trait]
impl DiagramApi for DiagramStoreClient {
    async fn list(&self) -> Result<Vec<Diagram>, ClientError> {
        let mut diagrams: Vec<Diagram> = self.request_data(Method::GET, "/diagrams", None).await?;
        diagrams.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(diagrams)
    }

    async fn get(&self, id: Uuid) -> Result<Diagram, ClientError> {
        self.request_data(Method::GET, &format!("/diagrams/{id}"), None)
            .await
    }

    async fn create(&self, mut request: CreateDiagramRequest) -> Result<Diagram, ClientError> {
        let title = normalize_title(request.title.as_deref().unwrap_or_default())
            .map_err(|e| ClientError::Validation(e.to_string()))?;
        request.title = Some(title);

        let body = to_body(&request)?;
        self.request_data(Method::POST, "/diagrams", Some(body))
            .await
    }

    async fn update(
        &self,
        id: Uuid,
        request: UpdateDiagramRequest,
    ) -> Result<Diagram, ClientError> {
        let body = to_body(&request)?;
        self.request_data(Method::PUT, &format!("/diagrams/{id}"), Some(body))
            .await
    }

    async fn delete(&self, id: Uuid) -> Result<Uuid, ClientError> {
        let deleted: DeletedDiagram = self
            .request_data(Method::DELETE, &format!("/diagrams/{id}"), None)
            .await?;
        Ok(deleted.id)
    }
}
