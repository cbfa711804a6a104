//! Credential provider seam.
//!
//! The store client asks for a bearer token before every request. Whatever
//! identity system issues it lives behind this trait.

use super::ClientError;
use async_trait::async_trait;

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_token(&self) -> Result<String, ClientError>;
}

/// Fixed token, for tools and tests.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn get_token(&self) -> Result<String, ClientError> {
        if self.0.trim().is_empty() {
            return Err(ClientError::Auth(
                "No authentication token available".to_string(),
            ));
        }
        Ok(self.0.clone())
    }
}
