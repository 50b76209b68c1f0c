//! Remote document store port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::{RecordingMetadata, RemoteId};

/// Remote store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Not authorised to access the store. Sign in with 'voice-memos login'")]
    Unauthorized,

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Rate limited. Please try again later")]
    RateLimited,

    #[error("Store error: {0}")]
    ApiError(String),

    #[error("Failed to parse store response: {0}")]
    ParseError(String),
}

/// Port for the remote document store holding recording metadata
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document in `collection`, returning the id the store assigned
    async fn create(
        &self,
        collection: &str,
        record: &RecordingMetadata,
    ) -> Result<RemoteId, StoreError>;

    /// Delete the document `id` from `collection`
    async fn delete(&self, collection: &str, id: &RemoteId) -> Result<(), StoreError>;
}

/// Blanket implementation for boxed store types
#[async_trait]
impl DocumentStore for Box<dyn DocumentStore> {
    async fn create(
        &self,
        collection: &str,
        record: &RecordingMetadata,
    ) -> Result<RemoteId, StoreError> {
        self.as_ref().create(collection, record).await
    }

    async fn delete(&self, collection: &str, id: &RemoteId) -> Result<(), StoreError> {
        self.as_ref().delete(collection, id).await
    }
}
