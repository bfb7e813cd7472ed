//! Wire types for the backend's JSON API.
//!
//! Field names match the backend payloads exactly; serde derives handle the
//! mapping. Response structs carry `#[serde(default)]` so a backend that
//! omits a field decodes to that field's default instead of failing the
//! whole call, and unknown fields are ignored, which keeps the client
//! tolerant of server-side additions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Users
// ============================================================================

/// The authenticated user's profile as returned by `GET /me`.
///
/// `extra` is an open bag of server-defined settings. Its keys are not
/// enumerated anywhere client-side, so it stays a string-to-value map.
/// The wire payload also carries a `password` field; it is not modeled
/// here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
    pub theme: String,
    pub language: String,
    pub timezone: String,
    pub entry_direction: String,
    pub entries_per_page: i64,
    pub keyboard_shortcuts: bool,
    pub show_reading_time: bool,
    pub entry_swipe: bool,
    pub gesture_nav: bool,
    pub standard_reading_time: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub extra: HashMap<String, serde_json::Value>,
}

// ============================================================================
// Categories
// ============================================================================

/// A user-defined grouping of feeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub hide_globally: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Feeds
// ============================================================================

/// A subscribed feed.
///
/// The backend returns more bookkeeping fields than the sync layer and its
/// consumers ever read (cookie jar, icon cache metadata, fetch credentials);
/// this struct models the consumed subset, minus the wire `password` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Feed {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub title: String,
    pub feed_url: String,
    pub site_url: String,
    pub checked_at: Option<DateTime<Utc>>,
    pub etag_header: String,
    pub last_modified_header: String,
    pub parsing_error_count: i64,
    pub parsing_error_message: String,
    pub scraper_rules: String,
    pub rewrite_rules: String,
    pub crawler: bool,
    pub blocklist_rules: String,
    pub keeplist_rules: String,
    pub urlrewrite_rules: String,
    pub ignore_http_cache: bool,
    pub allow_self_signed_certificates: bool,
    pub fetch_via_proxy: bool,
    pub disabled: bool,
    pub no_media_player: bool,
    pub hide_globally: bool,
    pub user_agent: String,
    pub username: String,
    pub icon_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A feed as returned by the listing endpoint: the feed itself flattened,
/// plus its resolved category and unread count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedWithStats {
    #[serde(flatten)]
    pub feed: Feed,
    pub category: Option<Category>,
    pub unread_count: u64,
}

impl FeedWithStats {
    pub fn id(&self) -> i64 {
        self.feed.id
    }
}

// ============================================================================
// Entries
// ============================================================================

/// Read-state axis of an entry. Independent from `starred`: an entry can be
/// read and starred at the same time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Unread,
    Read,
    Removed,
}

impl EntryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Unread => "unread",
            EntryStatus::Read => "read",
            EntryStatus::Removed => "removed",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "unread" => Ok(EntryStatus::Unread),
            "read" => Ok(EntryStatus::Read),
            "removed" => Ok(EntryStatus::Removed),
            other => Err(format!(
                "unknown entry status '{other}' (expected unread, read, or removed)"
            )),
        }
    }
}

/// Aggregate selector accepted by the list endpoint's `state` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    All,
    Starred,
    Unread,
}

impl EntryState {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryState::All => "all",
            EntryState::Starred => "starred",
            EntryState::Unread => "unread",
        }
    }
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryState {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(EntryState::All),
            "starred" => Ok(EntryState::Starred),
            "unread" => Ok(EntryState::Unread),
            other => Err(format!(
                "unknown entry state '{other}' (expected all, starred, or unread)"
            )),
        }
    }
}

/// A single article belonging to a feed, with the owning feed snapshotted
/// inline by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entry {
    pub id: i64,
    pub user_id: i64,
    pub feed_id: i64,
    pub status: EntryStatus,
    pub title: String,
    pub url: String,
    pub author: String,
    pub content: String,
    pub reading_time: i64,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub starred: bool,
    pub enclosure_url: String,
    pub enclosure_mime_type: String,
    pub enclosure_length: i64,
    pub feed: Feed,
    pub tags: Vec<String>,
}

/// One page of the entry listing.
///
/// A successful list call replaces the cached window with this whole value;
/// `entries` and `total` never mix across pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryListPage {
    pub total: u64,
    pub entries: Vec<Entry>,
}

// ============================================================================
// Entry Filter
// ============================================================================

/// Page size applied when a list call does not specify one.
pub const DEFAULT_LIMIT: u32 = 50;
/// Sort column applied when a list call does not specify one.
pub const DEFAULT_ORDER: &str = "published_at";
/// Sort direction applied when a list call does not specify one.
pub const DEFAULT_DIRECTION: &str = "desc";

/// Query descriptor for the entry listing, reused (narrowed) to scope bulk
/// status updates. `None` fields are omitted from the wire in both roles.
///
/// `before`/`after` are unix-timestamp cursors; `before_entry_id`/
/// `after_entry_id` are entry-id cursors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EntryStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<EntryState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_entry_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_entry_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl EntryFilter {
    /// Returns the filter with the listing defaults filled into any unset
    /// pagination field. Caller-supplied values always win.
    pub fn with_defaults(mut self) -> Self {
        self.limit.get_or_insert(DEFAULT_LIMIT);
        self.order.get_or_insert_with(|| DEFAULT_ORDER.to_string());
        self.direction
            .get_or_insert_with(|| DEFAULT_DIRECTION.to_string());
        self
    }

    /// Serializes the set fields as query parameters for the list endpoint.
    ///
    /// Pagination keys come first so a defaulted request reads
    /// `?limit=..&order=..&direction=..` followed by the narrowing fields.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(order) = &self.order {
            pairs.push(("order", order.clone()));
        }
        if let Some(direction) = &self.direction {
            pairs.push(("direction", direction.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(state) = self.state {
            pairs.push(("state", state.as_str().to_string()));
        }
        if let Some(feed_id) = self.feed_id {
            pairs.push(("feed_id", feed_id.to_string()));
        }
        if let Some(category_id) = self.category_id {
            pairs.push(("category_id", category_id.to_string()));
        }
        if let Some(before) = self.before {
            pairs.push(("before", before.to_string()));
        }
        if let Some(after) = self.after {
            pairs.push(("after", after.to_string()));
        }
        if let Some(before_entry_id) = self.before_entry_id {
            pairs.push(("before_entry_id", before_entry_id.to_string()));
        }
        if let Some(after_entry_id) = self.after_entry_id {
            pairs.push(("after_entry_id", after_entry_id.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

// ============================================================================
// Request Bodies
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct CreateCategoryRequest {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateCategoryRequest {
    pub title: String,
}

/// Body of a feed subscription request. Only `feed_url` is required; the
/// optional fields configure server-side fetching for the new feed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateFeedRequest {
    pub feed_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawler: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scraper_rules: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewrite_rules: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocklist_rules: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keeplist_rules: Option<String>,
}

/// Partial feed update; every field is optional and only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateFeedRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawler: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scraper_rules: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rewrite_rules: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocklist_rules: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keeplist_rules: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

/// Single-entry update body; `status` and `starred` can change independently.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateEntryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EntryStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
}

/// Body of the bulk entry update: the target status with the narrowing
/// filter flattened beside it.
#[derive(Debug, Clone, Serialize)]
pub struct BulkUpdateRequest {
    pub status: EntryStatus,
    #[serde(flatten)]
    pub filter: EntryFilter,
}

// ============================================================================
// Tests
// ============================================================================
