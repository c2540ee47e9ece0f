//! Document-store client — the single point of entry for all calls against
//! the managed document backend.
//!
//! ARCHITECTURAL RULE: no other module issues document-store HTTP requests
//! directly. Services reach this client through the trait seams they define
//! (`ResourceStore`, `BookmarkStore`, `ProfileStore`, `FeedbackSink`).
//!
//! No retries anywhere: a failed call is reported to the caller and the
//! in-memory state it would have fed is left untouched.

pub mod auth;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::bookmarks::BookmarkStore;
use crate::catalog::loader::ResourceStore;
use crate::feedback::{Feedback, FeedbackSink};
use crate::models::bookmark::Bookmark;
use crate::models::profile::UserProfile;
use crate::profile::service::ProfileStore;

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Error)]
pub enum DocStoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct Documents<T> {
    documents: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Thin client over the document backend's REST surface. Cheap to clone.
#[derive(Clone)]
pub struct DocStoreClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl DocStoreClient {
    pub fn new(base_url: String, api_key: String) -> DocStoreClient {
        DocStoreClient {
            // Timeouts stay at the library defaults.
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(&self, response: Response) -> Result<Response, DocStoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        // Prefer the backend's structured message when the body parses.
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        Err(DocStoreError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_documents<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<(&str, &str)>,
    ) -> Result<Vec<T>, DocStoreError> {
        let mut request = self
            .client
            .get(self.url(path))
            .header(API_KEY_HEADER, &self.api_key);
        if let Some((key, value)) = query {
            request = request.query(&[(key, value)]);
        }
        let response = self.check(request.send().await?).await?;
        let documents: Documents<T> = response.json().await?;
        Ok(documents.documents)
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile, DocStoreError> {
        let response = self
            .client
            .get(self.url(&format!("/v1/users/{user_id}")))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let response = self.check(response).await?;
        Ok(response.json().await?)
    }

    pub async fn update_profile(&self, user_id: &str, fields: &Value) -> Result<(), DocStoreError> {
        let response = self
            .client
            .patch(self.url(&format!("/v1/users/{user_id}")))
            .header(API_KEY_HEADER, &self.api_key)
            .json(fields)
            .send()
            .await?;
        self.check(response).await?;
        debug!(user_id, "profile updated");
        Ok(())
    }
}

#[async_trait]
impl ResourceStore for DocStoreClient {
    async fn fetch_resources(&self, category: Option<&str>) -> Result<Vec<Value>, DocStoreError> {
        self.get_documents("/v1/resources", category.map(|c| ("category", c)))
            .await
    }
}

#[async_trait]
impl BookmarkStore for DocStoreClient {
    async fn exists(&self, user_id: &str, resource_id: &str) -> Result<bool, DocStoreError> {
        let response = self
            .client
            .get(self.url(&format!("/v1/users/{user_id}/bookmarks/{resource_id}")))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        self.check(response).await?;
        Ok(true)
    }

    /// Keyed PUT — the resource id is the idempotency key, so a repeated
    /// create cannot produce a duplicate record.
    async fn put(
        &self,
        user_id: &str,
        resource_id: &str,
        bookmark: &Bookmark,
    ) -> Result<(), DocStoreError> {
        let response = self
            .client
            .put(self.url(&format!("/v1/users/{user_id}/bookmarks/{resource_id}")))
            .header(API_KEY_HEADER, &self.api_key)
            .json(bookmark)
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    async fn delete(&self, user_id: &str, resource_id: &str) -> Result<(), DocStoreError> {
        let response = self
            .client
            .delete(self.url(&format!("/v1/users/{user_id}/bookmarks/{resource_id}")))
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        // Deleting an already-absent bookmark is not an error.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        self.check(response).await?;
        Ok(())
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Bookmark>, DocStoreError> {
        self.get_documents(&format!("/v1/users/{user_id}/bookmarks"), None)
            .await
    }
}

#[async_trait]
impl ProfileStore for DocStoreClient {
    async fn fetch(&self, user_id: &str) -> Result<UserProfile, DocStoreError> {
        self.get_profile(user_id).await
    }

    async fn patch(&self, user_id: &str, fields: &Value) -> Result<(), DocStoreError> {
        self.update_profile(user_id, fields).await
    }
}

#[async_trait]
impl FeedbackSink for DocStoreClient {
    async fn submit(&self, feedback: &Feedback) -> Result<(), DocStoreError> {
        let response = self
            .client
            .post(self.url("/v1/feedback"))
            .header(API_KEY_HEADER, &self.api_key)
            .json(feedback)
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;
    use serde_json::json;

    fn client(server: &MockServer) -> DocStoreClient {
        DocStoreClient::new(server.base_url(), "test-key".to_string())
    }

    #[tokio::test]
    async fn test_list_resources_decodes_document_array() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/resources")
                    .query_param("category", "housing")
                    .header(API_KEY_HEADER, "test-key");
                then.status(200).json_body(json!({
                    "documents": [
                        { "id": "r1", "title": "AZ Housing Line" },
                        { "id": "r2" }
                    ]
                }));
            })
            .await;

        let docs = client(&server)
            .fetch_resources(Some("housing"))
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0]["title"], "AZ Housing Line");
    }

    #[tokio::test]
    async fn test_non_success_surfaces_api_error_with_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/resources");
                then.status(503)
                    .json_body(json!({ "error": { "message": "maintenance" } }));
            })
            .await;

        let err = client(&server).fetch_resources(None).await.unwrap_err();
        match err {
            DocStoreError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bookmark_exists_maps_404_to_false() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/users/u1/bookmarks/r1");
                then.status(404);
            })
            .await;

        assert!(!client(&server).exists("u1", "r1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_bookmark_tolerates_absent_record() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE).path("/v1/users/u1/bookmarks/r1");
                then.status(404);
            })
            .await;

        assert!(BookmarkStore::delete(&client(&server), "u1", "r1").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_profile_patches_partial_map() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/v1/users/u1")
                    .json_body(json!({ "region": "CA", "school": null }));
                then.status(204);
            })
            .await;

        client(&server)
            .update_profile("u1", &json!({ "region": "CA", "school": null }))
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
