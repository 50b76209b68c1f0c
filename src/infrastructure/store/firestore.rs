//! Firestore REST document store adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::application::ports::{DocumentStore, StoreError};
use crate::domain::auth::Identity;
use crate::domain::recording::{RecordingMetadata, RemoteId};

/// Firestore API base URL
const API_BASE_URL: &str = "https://firestore.googleapis.com";

// Request types for the Firestore API

#[derive(Debug, Serialize)]
struct CreateDocumentRequest<'a> {
    fields: RecordingFields<'a>,
}

#[derive(Debug, Serialize)]
struct RecordingFields<'a> {
    duration: StringValue<'a>,
    file: StringValue<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StringValue<'a> {
    string_value: &'a str,
}

// Response types for the Firestore API

#[derive(Debug, Deserialize)]
struct Document {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    status: Option<String>,
}

/// Cloud Firestore document store
pub struct FirestoreStore {
    api_key: String,
    project_id: String,
    base_url: String,
    identity: Option<watch::Receiver<Option<Identity>>>,
    client: reqwest::Client,
}

impl FirestoreStore {
    /// Create a store for the given Firebase web API key and project
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            base_url: API_BASE_URL.to_string(),
            identity: None,
            client: reqwest::Client::new(),
        }
    }

    /// Point the store at a different host (emulator or test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Authorise requests as whoever is signed in at the time of each call
    pub fn with_identity(mut self, identity: watch::Receiver<Option<Identity>>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// URL of a collection
    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}",
            self.base_url, self.project_id, collection
        )
    }

    /// URL of a single document
    fn document_url(&self, collection: &str, id: &RemoteId) -> String {
        format!("{}/{}", self.collection_url(collection), id.as_str())
    }

    fn build_request(record: &RecordingMetadata) -> CreateDocumentRequest<'_> {
        CreateDocumentRequest {
            fields: RecordingFields {
                duration: StringValue {
                    string_value: &record.duration,
                },
                file: StringValue {
                    string_value: &record.file,
                },
            },
        }
    }

    /// Document id is the last segment of the resource name
    fn document_id(name: &str) -> Result<RemoteId, StoreError> {
        let id = name.rsplit('/').next().unwrap_or_default();
        RemoteId::new(id).map_err(|e| StoreError::ParseError(e.to_string()))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.query(&[("key", self.api_key.as_str())]);
        let token = self
            .identity
            .as_ref()
            .and_then(|rx| rx.borrow().as_ref().map(|id| id.id_token.clone()));

        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Map a non-success response to a store error
    async fn error_for(response: reqwest::Response, subject: &str) -> StoreError {
        let status = response.status();

        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                return StoreError::Unauthorized
            }
            reqwest::StatusCode::NOT_FOUND => return StoreError::NotFound(subject.to_string()),
            reqwest::StatusCode::TOO_MANY_REQUESTS => return StoreError::RateLimited,
            _ => {}
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        match serde_json::from_str::<ErrorResponse>(&error_text) {
            Ok(body) => StoreError::ApiError(format!(
                "HTTP {} {}: {}",
                status,
                body.error.status.unwrap_or_default(),
                body.error.message
            )),
            Err(_) => StoreError::ApiError(format!("HTTP {}: {}", status, error_text)),
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn create(
        &self,
        collection: &str,
        record: &RecordingMetadata,
    ) -> Result<RemoteId, StoreError> {
        let url = self.collection_url(collection);
        let body = Self::build_request(record);

        let response = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response, collection).await);
        }

        let document: Document = response
            .json()
            .await
            .map_err(|e| StoreError::ParseError(e.to_string()))?;

        let name = document
            .name
            .ok_or_else(|| StoreError::ParseError("Response has no document name".into()))?;
        let id = Self::document_id(&name)?;

        debug!(collection, id = %id, "document created");
        Ok(id)
    }

    async fn delete(&self, collection: &str, id: &RemoteId) -> Result<(), StoreError> {
        let url = self.document_url(collection, id);

        let response = self
            .authorize(self.client.delete(&url))
            .send()
            .await
            .map_err(|e| StoreError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response, id.as_str()).await);
        }

        debug!(collection, id = %id, "document deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::DurationLabel;

    #[test]
    fn collection_url_has_project_and_collection() {
        let store = FirestoreStore::new("key", "memos-dev");
        assert_eq!(
            store.collection_url("recordings"),
            "https://firestore.googleapis.com/v1/projects/memos-dev/databases/(default)/documents/recordings"
        );
    }

    #[test]
    fn document_url_appends_id() {
        let store = FirestoreStore::new("key", "memos-dev").with_base_url("http://localhost:8080/");
        let id = RemoteId::new("abc123").unwrap();
        assert_eq!(
            store.document_url("recordings", &id),
            "http://localhost:8080/v1/projects/memos-dev/databases/(default)/documents/recordings/abc123"
        );
    }

    #[test]
    fn request_body_uses_string_values() {
        let record = RecordingMetadata::new(&DurationLabel::from_millis(125_000), "file:///a.flac");
        let body = serde_json::to_value(FirestoreStore::build_request(&record)).unwrap();

        assert_eq!(body["fields"]["duration"]["stringValue"], "2:05");
        assert_eq!(body["fields"]["file"]["stringValue"], "file:///a.flac");
    }

    #[test]
    fn document_id_from_name() {
        let id = FirestoreStore::document_id(
            "projects/p/databases/(default)/documents/recordings/XyZ9",
        )
        .unwrap();
        assert_eq!(id.as_str(), "XyZ9");
    }

    #[test]
    fn document_id_rejects_empty() {
        let result = FirestoreStore::document_id("projects/p/databases/(default)/documents/recordings/");
        assert!(matches!(result, Err(StoreError::ParseError(_))));
    }
}
