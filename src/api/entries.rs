//! Entry endpoint accessors.

use crate::api::{ApiClient, ApiError};
use crate::types::{
    BulkUpdateRequest, Entry, EntryFilter, EntryListPage, EntryStatus, UpdateEntryRequest,
};

/// `GET /entries`. The filter's set fields become query parameters.
pub async fn list(client: &ApiClient, filter: &EntryFilter) -> Result<EntryListPage, ApiError> {
    client.get_with_params("/entries", &filter.query_pairs()).await
}

/// `GET /entries/{id}`.
pub async fn get(client: &ApiClient, id: i64) -> Result<Entry, ApiError> {
    client.get(&format!("/entries/{id}")).await
}

/// `PUT /entries/{id}`.
pub async fn update(
    client: &ApiClient,
    id: i64,
    request: &UpdateEntryRequest,
) -> Result<Entry, ApiError> {
    client.put(&format!("/entries/{id}"), request).await
}

/// `PUT /entries/{id}` with `{"status": "read"}`.
pub async fn mark_as_read(client: &ApiClient, id: i64) -> Result<Entry, ApiError> {
    update(
        client,
        id,
        &UpdateEntryRequest {
            status: Some(EntryStatus::Read),
            starred: None,
        },
    )
    .await
}

/// `PUT /entries/{id}` with `{"status": "unread"}`.
pub async fn mark_as_unread(client: &ApiClient, id: i64) -> Result<Entry, ApiError> {
    update(
        client,
        id,
        &UpdateEntryRequest {
            status: Some(EntryStatus::Unread),
            starred: None,
        },
    )
    .await
}

/// `PUT /entries/{id}` with `{"starred": <flag>}`; the status axis is left
/// alone.
pub async fn toggle_star(client: &ApiClient, id: i64, starred: bool) -> Result<Entry, ApiError> {
    update(
        client,
        id,
        &UpdateEntryRequest {
            status: None,
            starred: Some(starred),
        },
    )
    .await
}

/// `PUT /entries` with `{"status": "read"}` plus the filter's set fields
/// flattened into the body. The backend applies the status to every entry
/// the filter matches.
pub async fn mark_all_as_read(client: &ApiClient, filter: &EntryFilter) -> Result<(), ApiError> {
    let body = BulkUpdateRequest {
        status: EntryStatus::Read,
        filter: filter.clone(),
    };
    client.put_discard("/entries", &body).await
}

// ============================================================================
// Tests
// ============================================================================
