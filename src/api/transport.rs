//! Authenticated transport to the backend.
//!
//! One `ApiClient` wraps one `reqwest::Client` configured with the base URL
//! and a fixed timeout. Every request picks up the vault credential at send
//! time, and every response funnels through a single normalization point:
//! 2xx passes through, 401 purges the session, anything else is reduced to
//! a human-readable message. Failed calls always publish a `Notice` before
//! they return; callers decide separately whether to propagate or swallow.

use crate::notify::Notifier;
use crate::session::CredentialVault;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Notice text for a rejected credential.
const AUTH_FAILED_MESSAGE: &str = "authentication failed, please log in again";
/// Last-resort notice text when neither the backend nor the transport
/// offered anything better.
const GENERIC_FAILURE_MESSAGE: &str = "request failed";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the session credential (HTTP 401). The vault is
    /// already cleared when this surfaces; callers must not assume recovery.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Any other failed request: non-2xx status, connect error, or timeout.
    /// `message` is the same text published on the notice channel.
    #[error("{message}")]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },

    /// A 2xx response whose body did not decode as the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Error envelope the backend attaches to failed requests.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error_message: Option<String>,
}

/// Reduces a failure to its user-facing message: the backend's
/// `error_message` when present and non-empty, else the transport-level
/// text, else the generic fallback.
fn failure_message(envelope: Option<String>, transport_text: String) -> String {
    match envelope {
        Some(message) if !message.is_empty() => message,
        _ if !transport_text.is_empty() => transport_text,
        _ => GENERIC_FAILURE_MESSAGE.to_string(),
    }
}

// ============================================================================
// Client
// ============================================================================

pub struct ApiClient {
    http: reqwest::Client,
    /// Base URL with any trailing slash trimmed; paths supply their own.
    base: String,
    vault: Arc<CredentialVault>,
    notifier: Notifier,
}

impl ApiClient {
    pub fn new(
        base_url: &Url,
        timeout: Duration,
        vault: Arc<CredentialVault>,
        notifier: Notifier,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base: base_url.as_str().trim_end_matches('/').to_string(),
            vault,
            notifier,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.dispatch(self.route(Method::GET, path)).await?).await
    }

    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let request = self.route(Method::GET, path).query(params);
        decode(self.dispatch(request).await?).await
    }

    /// GET for binary endpoints; the body is returned unparsed.
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.dispatch(self.route(Method::GET, path)).await?;
        let bytes = response.bytes().await.map_err(ApiError::Decode)?;
        Ok(bytes.to_vec())
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.route(Method::POST, path).json(body);
        decode(self.dispatch(request).await?).await
    }

    /// POST without a request body, for endpoints that act on the path alone
    /// and respond with a JSON entity.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.dispatch(self.route(Method::POST, path)).await?).await
    }

    /// POST without a request body, response body discarded.
    pub async fn post_discard(&self, path: &str) -> Result<(), ApiError> {
        self.dispatch(self.route(Method::POST, path)).await?;
        Ok(())
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.route(Method::PUT, path).json(body);
        decode(self.dispatch(request).await?).await
    }

    /// PUT whose response body is discarded after the status check.
    pub async fn put_discard<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let request = self.route(Method::PUT, path).json(body);
        self.dispatch(request).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.dispatch(self.route(Method::DELETE, path)).await?;
        Ok(())
    }

    /// Builds a request for `path` (leading slash, relative to the base URL)
    /// with the session credential attached when one is stored.
    fn route(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self.http.request(method, format!("{}{}", self.base, path));
        if let Some(header) = self.vault.authorization_header() {
            request = request.header(AUTHORIZATION, header);
        }
        request
    }

    /// Single normalization point for every response.
    ///
    /// 401 clears the vault and publishes both the error notice and the
    /// login-required signal; the envelope message is never consulted for
    /// it. Other failures publish the best available message. One attempt
    /// only; nothing is retried here.
    async fn dispatch(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                let message = failure_message(None, err.to_string());
                tracing::warn!(error = %err, "transport error");
                self.notifier.error(message.clone());
                return Err(ApiError::RequestFailed {
                    status: None,
                    message,
                });
            }
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(url = %response.url(), "credential rejected, clearing session");
            self.vault.clear();
            self.notifier.error(AUTH_FAILED_MESSAGE);
            self.notifier.auth_required();
            return Err(ApiError::AuthenticationFailed);
        }

        if !status.is_success() {
            let envelope = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.error_message);
            let message = failure_message(
                envelope,
                format!("request failed with status code {}", status.as_u16()),
            );
            tracing::warn!(status = status.as_u16(), message = %message, "request failed");
            self.notifier.error(message.clone());
            return Err(ApiError::RequestFailed {
                status: Some(status.as_u16()),
                message,
            });
        }

        Ok(response)
    }
}

// Decode failures are not published as notices; only failed requests are.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response.json::<T>().await.map_err(|err| {
        tracing::warn!(error = %err, "failed to decode response body");
        ApiError::Decode(err)
    })
}

// ============================================================================
// Tests
// ============================================================================
