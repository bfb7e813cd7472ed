//! Session endpoint accessor.

use crate::api::{ApiClient, ApiError};
use crate::types::User;

/// `GET /me`. Doubles as the credential validation call: the backend
/// answers 401 unless the attached credential is good.
pub async fn current_user(client: &ApiClient) -> Result<User, ApiError> {
    client.get("/me").await
}
