//! Category endpoint accessors.

use crate::api::{ApiClient, ApiError};
use crate::types::{Category, CreateCategoryRequest, UpdateCategoryRequest};

/// `GET /categories`.
pub async fn list(client: &ApiClient) -> Result<Vec<Category>, ApiError> {
    client.get("/categories").await
}

/// `POST /categories`.
pub async fn create(
    client: &ApiClient,
    request: &CreateCategoryRequest,
) -> Result<Category, ApiError> {
    client.post("/categories", request).await
}

/// `PUT /categories/{id}`.
pub async fn update(
    client: &ApiClient,
    id: i64,
    request: &UpdateCategoryRequest,
) -> Result<Category, ApiError> {
    client.put(&format!("/categories/{id}"), request).await
}

/// `DELETE /categories/{id}`.
pub async fn delete(client: &ApiClient, id: i64) -> Result<(), ApiError> {
    client.delete(&format!("/categories/{id}")).await
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Notifier;
    use crate::session::CredentialVault;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        let url = Url::parse(&server.uri()).unwrap();
        ApiClient::new(
            &url,
            Duration::from_secs(5),
            Arc::new(CredentialVault::new()),
            Notifier::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_sends_title_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/categories"))
            .and(body_json(json!({"title": "News"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 3, "title": "News"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let category = create(
            &client,
            &CreateCategoryRequest {
                title: "News".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(category.id, 3);
        assert_eq!(category.title, "News");
    }

    #[tokio::test]
    async fn test_update_targets_category_path() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/categories/3"))
            .and(body_json(json!({"title": "Tech"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 3, "title": "Tech"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let category = update(
            &client,
            3,
            &UpdateCategoryRequest {
                title: "Tech".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(category.title, "Tech");
    }
}
