//! Client helpers for listing and removing the account's passkeys.

use crate::{
    app_lib::{api::path_id, ApiClient, ConsoleError},
    features::passkeys::types::{DeletePasskeyResponse, PasskeyRecord},
};
use secrecy::SecretString;
use tracing::instrument;

/// Lists the passkeys registered to the signed-in account.
///
/// # Errors
/// Returns the mapped API error.
#[instrument(skip(api, token))]
pub async fn list(api: &ApiClient, token: &SecretString) -> Result<Vec<PasskeyRecord>, ConsoleError> {
    api.get_json("/passkey/user", Some(token))
        .await
        .map_err(|failure| failure.or_reason("Failed to fetch passkeys"))
}

/// Removes one passkey.
///
/// # Errors
/// Returns `Validation` for a malformed id or when the server refuses.
#[instrument(skip(api, token))]
pub async fn delete(
    api: &ApiClient,
    token: &SecretString,
    passkey_id: &str,
) -> Result<DeletePasskeyResponse, ConsoleError> {
    let id = path_id(passkey_id, "Passkey")?;
    api.delete_json(&format!("/passkey/user/{id}"), Some(token))
        .await
        .map_err(|failure| failure.or_reason("Failed to delete passkey"))
}
