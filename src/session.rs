//! Process-lifetime home of the session credential.
//!
//! The vault is the one value shared between the transport and the session
//! store; both receive it by `Arc`, so neither depends on the other's
//! construction order. It holds the encoded Basic credential for the life
//! of the process: login stores it, logout and authentication failures
//! clear it, and the transport reads it at send time. Nothing is ever
//! written to disk.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use secrecy::{ExposeSecret, SecretString};
use std::sync::{PoisonError, RwLock};

/// Derives the session credential for HTTP Basic auth: base64 of
/// `username:password`.
///
/// SEC-001: base64 is an encoding, not encryption. Anyone able to read the
/// vault contents can recover the password. The backend's auth scheme
/// dictates this exact token shape; a server-issued opaque session token
/// would remove the plaintext-recovery risk.
pub fn encode_basic_credential(username: &str, password: &str) -> SecretString {
    SecretString::from(STANDARD.encode(format!("{username}:{password}")))
}

/// In-memory cell for the session credential.
#[derive(Debug, Default)]
pub struct CredentialVault {
    credential: RwLock<Option<SecretString>>,
}

impl CredentialVault {
    /// Creates an empty vault. Seeding (from config or environment) is the
    /// composition root's job.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, credential: SecretString) {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credential);
    }

    pub fn clear(&self) {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_present(&self) -> bool {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Renders the `Authorization` header value for the stored credential,
    /// or `None` when the vault is empty. The secret is exposed only here,
    /// at header-construction time.
    pub fn authorization_header(&self) -> Option<String> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|credential| format!("Basic {}", credential.expose_secret()))
    }
}

// ============================================================================
// Tests
// ============================================================================
