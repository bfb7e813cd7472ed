//! Feed endpoint accessors.

use crate::api::{ApiClient, ApiError};
use crate::types::{CreateFeedRequest, Feed, FeedWithStats, UpdateFeedRequest};

/// `GET /feeds`. Feeds come back enriched with unread counts and their
/// resolved category.
pub async fn list(client: &ApiClient) -> Result<Vec<FeedWithStats>, ApiError> {
    client.get("/feeds").await
}

/// `GET /feeds/{id}`.
pub async fn get(client: &ApiClient, id: i64) -> Result<Feed, ApiError> {
    client.get(&format!("/feeds/{id}")).await
}

/// `POST /feeds`.
pub async fn create(client: &ApiClient, request: &CreateFeedRequest) -> Result<Feed, ApiError> {
    client.post("/feeds", request).await
}

/// `PUT /feeds/{id}`. Partial update; unset request fields are untouched.
pub async fn update(
    client: &ApiClient,
    id: i64,
    request: &UpdateFeedRequest,
) -> Result<Feed, ApiError> {
    client.put(&format!("/feeds/{id}"), request).await
}

/// `DELETE /feeds/{id}`.
pub async fn delete(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.delete(&format!("/feeds/{id}")).await
}

/// `POST /feeds/{id}/refresh`. The backend re-fetches the feed and returns
/// its updated record.
pub async fn refresh(client: &ApiClient, id: i64) -> Result<Feed, ApiError> {
    client.post_empty(&format!("/feeds/{id}/refresh")).await
}

/// `POST /feeds/refresh-all`.
pub async fn refresh_all(client: &ApiClient) -> Result<(), ApiError> {
    client.post_discard("/feeds/refresh-all").await
}

/// `GET /feeds/{id}/icon`. Binary response, returned as raw bytes.
pub async fn icon(client: &ApiClient, id: i64) -> Result<Vec<u8>, ApiError> {
    client.get_bytes(&format!("/feeds/{id}/icon")).await
}

// ============================================================================
// Tests
// ============================================================================
