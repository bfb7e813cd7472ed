//! Cached window over the entry listing.
//!
//! The store holds one page of entries at a time plus the filter that
//! produced it. Mutating operations confirm with the backend first and only
//! then patch the cached copies, so local state never has to roll back.

use crate::api::{entries, ApiClient, ApiError};
use crate::types::{Entry, EntryFilter, EntryStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// The cached slice of the entry listing plus the server's total match
/// count for the active filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryWindow {
    pub entries: Vec<Entry>,
    pub total: u64,
}

pub struct EntryStore {
    client: Arc<ApiClient>,
    window: RwLock<EntryWindow>,
    current: RwLock<Option<Entry>>,
    filter: RwLock<EntryFilter>,
    // Plain toggle, not a counter. When fetches overlap it clears as soon
    // as the first one finishes.
    loading: AtomicBool,
}

impl EntryStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            window: RwLock::new(EntryWindow::default()),
            current: RwLock::new(None),
            filter: RwLock::new(EntryFilter::default()),
            loading: AtomicBool::new(false),
        }
    }

    /// Merges the listing defaults into `filter`, records the merged filter
    /// as current, and replaces the cached window from one list call. On
    /// failure the previous window stays in place and the error is only
    /// logged.
    ///
    /// In-flight calls are not cancelled. When calls overlap, whichever
    /// response lands last owns the window, while the recorded filter
    /// belongs to whichever call started last; the two can disagree until
    /// the next fetch completes.
    pub async fn fetch_entries(&self, filter: EntryFilter) {
        self.loading.store(true, Ordering::Relaxed);
        let effective = filter.with_defaults();
        // Recorded before the request goes out, so the store reflects the
        // attempted query even when the request fails.
        *self.filter.write().unwrap_or_else(PoisonError::into_inner) = effective.clone();
        match entries::list(&self.client, &effective).await {
            Ok(page) => {
                // Entries and total swap together under one lock; readers
                // never see the new list paired with the old count.
                *self.window.write().unwrap_or_else(PoisonError::into_inner) = EntryWindow {
                    entries: page.entries,
                    total: page.total,
                };
            }
            Err(err) => tracing::warn!(error = %err, "failed to fetch entries"),
        }
        self.loading.store(false, Ordering::Relaxed);
    }

    /// Fetches one entry's full detail and installs it as the current
    /// entry. Unlike the listing path this propagates failure, since a
    /// detail view has to know its fetch came back empty-handed.
    pub async fn fetch_entry(&self, id: i64) -> Result<Entry, ApiError> {
        self.loading.store(true, Ordering::Relaxed);
        let result = entries::get(&self.client, id).await;
        match &result {
            Ok(entry) => {
                *self.current.write().unwrap_or_else(PoisonError::into_inner) =
                    Some(entry.clone());
            }
            Err(err) => tracing::warn!(entry_id = id, error = %err, "failed to fetch entry"),
        }
        self.loading.store(false, Ordering::Relaxed);
        result
    }

    /// Marks one entry read on the server, then patches the cached copy in
    /// the window. The current-entry slot is not touched.
    pub async fn mark_as_read(&self, id: i64) {
        match entries::mark_as_read(&self.client, id).await {
            Ok(_) => self.patch_status(id, EntryStatus::Read),
            Err(err) => tracing::warn!(entry_id = id, error = %err, "failed to mark entry read"),
        }
    }

    /// Marks one entry unread on the server, then patches the cached copy
    /// in the window. The current-entry slot is not touched.
    pub async fn mark_as_unread(&self, id: i64) {
        match entries::mark_as_unread(&self.client, id).await {
            Ok(_) => self.patch_status(id, EntryStatus::Unread),
            Err(err) => {
                tracing::warn!(entry_id = id, error = %err, "failed to mark entry unread");
            }
        }
    }

    /// Sets the starred flag to `starred` on the server, then patches both
    /// the window copy and the current-entry slot when their ids match.
    pub async fn toggle_star(&self, id: i64, starred: bool) {
        match entries::toggle_star(&self.client, id, starred).await {
            Ok(_) => {
                {
                    let mut window = self.window.write().unwrap_or_else(PoisonError::into_inner);
                    if let Some(entry) = window.entries.iter_mut().find(|e| e.id == id) {
                        entry.starred = starred;
                    }
                }
                let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
                if let Some(entry) = current.as_mut() {
                    if entry.id == id {
                        entry.starred = starred;
                    }
                }
            }
            Err(err) => tracing::warn!(entry_id = id, error = %err, "failed to toggle star"),
        }
    }

    /// Issues one bulk status update scoped by `filter`, then sets every
    /// cached entry to read.
    ///
    /// BUG-001: the request is scoped by `filter` but the local patch is
    /// not. A cached entry outside the filter's scope flips to read locally
    /// even though the server never touched it; the divergence lasts until
    /// the next fetch replaces the window.
    pub async fn mark_all_as_read(&self, filter: EntryFilter) {
        match entries::mark_all_as_read(&self.client, &filter).await {
            Ok(()) => {
                let mut window = self.window.write().unwrap_or_else(PoisonError::into_inner);
                for entry in &mut window.entries {
                    entry.status = EntryStatus::Read;
                }
            }
            Err(err) => tracing::warn!(error = %err, "failed to mark all entries read"),
        }
    }

    fn patch_status(&self, id: i64, status: EntryStatus) {
        let mut window = self.window.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = window.entries.iter_mut().find(|e| e.id == id) {
            entry.status = status;
        }
    }

    /// Local cache lookup over the current window, no network involved.
    pub fn get_entry_by_id(&self, id: i64) -> Option<Entry> {
        self.window
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.window
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clone()
    }

    pub fn total(&self) -> u64 {
        self.window
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .total
    }

    pub fn window(&self) -> EntryWindow {
        self.window
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current_entry(&self) -> Option<Entry> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The filter behind the most recently started list call, with the
    /// listing defaults already merged in.
    pub fn current_filter(&self) -> EntryFilter {
        self.filter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Tests
// ============================================================================
