//! Cached feed and category metadata.
//!
//! Both lists are replaced wholesale from their listing endpoints; there is
//! no incremental merging. Failed loads keep the previous cache, so
//! consumers always see the last known-good state.

use crate::api::{categories, feeds, ApiClient, ApiError};
use crate::types::{Category, FeedWithStats};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

pub struct MetadataStore {
    client: Arc<ApiClient>,
    feeds: RwLock<Vec<FeedWithStats>>,
    categories: RwLock<Vec<Category>>,
    loading: AtomicBool,
}

impl MetadataStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            feeds: RwLock::new(Vec::new()),
            categories: RwLock::new(Vec::new()),
            loading: AtomicBool::new(false),
        }
    }

    /// Replaces the feed cache from the listing endpoint. On failure the
    /// previous cache stays in place and the error is only logged.
    pub async fn fetch_feeds(&self) {
        self.loading.store(true, Ordering::Relaxed);
        match feeds::list(&self.client).await {
            Ok(feeds) => {
                *self.feeds.write().unwrap_or_else(PoisonError::into_inner) = feeds;
            }
            Err(err) => tracing::warn!(error = %err, "failed to fetch feeds"),
        }
        self.loading.store(false, Ordering::Relaxed);
    }

    /// Replaces the category cache. Independent of [`MetadataStore::fetch_feeds`];
    /// one failing does not affect the other.
    pub async fn fetch_categories(&self) {
        match categories::list(&self.client).await {
            Ok(categories) => {
                *self
                    .categories
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = categories;
            }
            Err(err) => tracing::warn!(error = %err, "failed to fetch categories"),
        }
    }

    /// Asks the backend to re-fetch one feed, then reloads the whole feed
    /// list. No partial update: the fresh listing is the source of truth
    /// for the new fetch metadata and unread counts.
    pub async fn refresh_feed(&self, id: i64) {
        match feeds::refresh(&self.client, id).await {
            // The refreshed record itself is discarded; the reload carries
            // the same data plus recalculated counts.
            Ok(_) => self.fetch_feeds().await,
            Err(err) => tracing::warn!(feed_id = id, error = %err, "failed to refresh feed"),
        }
    }

    /// Deletes the feed remotely, dropping it from the cache only once the
    /// backend confirms. On failure the cache is untouched and the error
    /// propagates, since callers usually have to react to a failed delete.
    pub async fn delete_feed(&self, id: i64) -> Result<(), ApiError> {
        match feeds::delete(&self.client, id).await {
            Ok(()) => {
                self.feeds
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .retain(|feed| feed.id() != id);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(feed_id = id, error = %err, "failed to delete feed");
                Err(err)
            }
        }
    }

    /// Loads feeds and categories concurrently for bootstrap.
    pub async fn refresh_metadata(&self) {
        futures::join!(self.fetch_feeds(), self.fetch_categories());
    }

    pub fn feeds(&self) -> Vec<FeedWithStats> {
        self.feeds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.categories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Local cache lookup, no network involved.
    pub fn get_feed_by_id(&self, id: i64) -> Option<FeedWithStats> {
        self.feeds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|feed| feed.id() == id)
            .cloned()
    }

    /// Local cache lookup, no network involved.
    pub fn get_category_by_id(&self, id: i64) -> Option<Category> {
        self.categories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|category| category.id == id)
            .cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::notify::Notifier;
    use crate::session::CredentialVault;
    use serde_json::json;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server: &MockServer) -> MetadataStore {
        let url = Url::parse(&server.uri()).unwrap();
        let client = Arc::new(
            ApiClient::new(
                &url,
                Duration::from_secs(5),
                Arc::new(CredentialVault::new()),
                Notifier::new(),
            )
            .unwrap(),
        );
        MetadataStore::new(client)
    }

    fn feed_json(id: i64, title: &str, unread: u64) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "feed_url": format!("https://example.com/{id}.xml"),
            "unread_count": unread
        })
    }

    #[tokio::test]
    async fn test_fetch_feeds_replaces_cache_wholesale() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                feed_json(1, "One", 3),
                feed_json(2, "Two", 0),
            ])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/feeds"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([feed_json(3, "Three", 1)])),
            )
            .mount(&server)
            .await;

        let store = store_for(&server);

        store.fetch_feeds().await;
        assert_eq!(store.feeds().len(), 2);

        store.fetch_feeds().await;
        let feeds = store.feeds();
        // The second listing fully replaces the first; nothing is merged.
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].id(), 3);
    }

    #[tokio::test]
    async fn test_fetch_feeds_failure_keeps_stale_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([feed_json(1, "One", 3)])),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/feeds"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({})))
            .mount(&server)
            .await;

        let store = store_for(&server);

        store.fetch_feeds().await;
        store.fetch_feeds().await;

        let feeds = store.feeds();
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].id(), 1);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_category_fetch_independent_of_feeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"id": 2, "title": "News"}])),
            )
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.refresh_metadata().await;

        assert!(store.feeds().is_empty());
        assert_eq!(store.categories().len(), 1);
        assert_eq!(store.get_category_by_id(2).map(|c| c.title), Some("News".to_string()));
    }

    #[tokio::test]
    async fn test_refresh_feed_reloads_feed_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/feeds/7/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(feed_json(7, "Seven", 0)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/feeds"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([feed_json(7, "Seven", 5)])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.refresh_feed(7).await;

        let feeds = store.feeds();
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].unread_count, 5);
    }

    #[tokio::test]
    async fn test_refresh_feed_failure_skips_reload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/feeds/7/refresh"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/feeds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.refresh_feed(7).await;

        assert!(store.feeds().is_empty());
    }

    #[tokio::test]
    async fn test_delete_feed_drops_cached_entry_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                feed_json(1, "One", 3),
                feed_json(2, "Two", 0),
            ])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/feeds/1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.fetch_feeds().await;

        store.delete_feed(1).await.unwrap();

        let feeds = store.feeds();
        assert_eq!(feeds.len(), 1);
        assert_eq!(feeds[0].id(), 2);
    }

    #[tokio::test]
    async fn test_delete_feed_failure_keeps_cache_and_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                feed_json(1, "One", 3),
                feed_json(2, "Two", 0),
            ])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/feeds/2"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"error_message": "feed is busy"})),
            )
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.fetch_feeds().await;
        let before = store.feeds();

        let result = store.delete_feed(2).await;

        match result {
            Err(ApiError::RequestFailed { status, message }) => {
                assert_eq!(status, Some(500));
                assert_eq!(message, "feed is busy");
            }
            other => panic!("expected RequestFailed, got {other:?}"),
        }
        assert_eq!(store.feeds(), before);
    }

    #[tokio::test]
    async fn test_lookups_never_touch_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([feed_json(1, "One", 3)])),
            )
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.fetch_feeds().await;
        let requests_after_fetch = server.received_requests().await.unwrap().len();

        assert_eq!(store.get_feed_by_id(1).map(|f| f.id()), Some(1));
        assert!(store.get_feed_by_id(99).is_none());
        assert!(store.get_category_by_id(1).is_none());

        assert_eq!(
            server.received_requests().await.unwrap().len(),
            requests_after_fetch
        );
    }

    #[tokio::test]
    async fn test_refresh_metadata_loads_both_lists() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feeds"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([feed_json(1, "One", 2)])),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"id": 4, "title": "Blogs"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.refresh_metadata().await;

        assert_eq!(store.feeds().len(), 1);
        assert_eq!(store.categories().len(), 1);
    }
}
