//! Session state: credential lifecycle, validated flag, user profile.
//!
//! The store owns the profile and the validated flag; the credential itself
//! lives in the shared [`CredentialVault`]. `is_authenticated` is the
//! conjunction of both, so a 401 on any in-flight request (which empties
//! the vault) deauthenticates the session without this store's involvement.

use crate::api::{auth, ApiClient};
use crate::session::{encode_basic_credential, CredentialVault};
use crate::types::User;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

pub struct SessionStore {
    client: Arc<ApiClient>,
    vault: Arc<CredentialVault>,
    user: RwLock<Option<User>>,
    validated: AtomicBool,
    loading: AtomicBool,
}

impl SessionStore {
    /// Construction is side-effect-free; call [`SessionStore::initialize`]
    /// once from the composition root to validate a pre-seeded credential.
    pub fn new(client: Arc<ApiClient>, vault: Arc<CredentialVault>) -> Self {
        Self {
            client,
            vault,
            user: RwLock::new(None),
            validated: AtomicBool::new(false),
            loading: AtomicBool::new(false),
        }
    }

    /// One-time bootstrap step: when the composition root seeded the vault
    /// (config file or `WEIR_SESSION`), validate that credential now.
    pub async fn initialize(&self) {
        if self.vault.is_present() {
            self.fetch_current_user().await;
        }
    }

    /// Encodes and stores the credential, then validates it with a profile
    /// fetch. Returns whether the session is now authenticated.
    ///
    /// A failed validation clears the vault, the profile, and the flag; a
    /// credential is never left behind after a failed login. The underlying
    /// error is logged, not returned.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        self.loading.store(true, Ordering::Relaxed);

        // The validation request reads the credential from the vault, so it
        // must be stored before the call goes out.
        self.vault
            .store(encode_basic_credential(username, password));

        let authenticated = match auth::current_user(&self.client).await {
            Ok(user) => {
                *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
                self.validated.store(true, Ordering::Relaxed);
                true
            }
            Err(err) => {
                tracing::warn!(username, error = %err, "login validation failed");
                self.vault.clear();
                *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
                self.validated.store(false, Ordering::Relaxed);
                false
            }
        };

        self.loading.store(false, Ordering::Relaxed);
        authenticated
    }

    /// Refreshes the profile for an already-stored credential. Without a
    /// credential this is a local no-op that clears the validated flag.
    ///
    /// A failed fetch purges the whole session via [`SessionStore::logout`];
    /// a credential is never left in a stored-but-unvalidated limbo.
    pub async fn fetch_current_user(&self) {
        if !self.vault.is_present() {
            self.validated.store(false, Ordering::Relaxed);
            return;
        }

        match auth::current_user(&self.client).await {
            Ok(user) => {
                *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
                self.validated.store(true, Ordering::Relaxed);
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch current user, purging session");
                self.logout();
            }
        }
    }

    /// Clears credential, profile, and validated flag. Purely local, no
    /// network call.
    pub fn logout(&self) {
        self.vault.clear();
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.validated.store(false, Ordering::Relaxed);
    }

    /// True only while a validated credential is still present in the vault.
    pub fn is_authenticated(&self) -> bool {
        self.validated.load(Ordering::Relaxed) && self.vault.is_present()
    }

    pub fn is_admin(&self) -> bool {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|user| user.is_admin)
            .unwrap_or(false)
    }

    pub fn current_user(&self) -> Option<User> {
        self.user
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
