//! Client helpers for admin user management. Authorization is enforced by the
//! backend; these calls only carry the admin's bearer token.

use crate::{
    app_lib::{api::path_id, ApiClient, ConsoleError},
    features::{
        admin::types::{
            AdminUserDetail, SetRoleRequest, UserDetailResponse, UserSearchFilters,
            UserSearchResult, UserStats,
        },
        auth::types::Role,
    },
};
use secrecy::SecretString;
use serde_json::Value;
use tracing::instrument;

/// # Errors
/// Returns the mapped API error.
#[instrument(skip(api, token))]
pub async fn stats(api: &ApiClient, token: &SecretString) -> Result<UserStats, ConsoleError> {
    api.get_json("/admin/users/stats", Some(token))
        .await
        .map_err(|failure| failure.or_reason("Failed to fetch stats"))
}

/// # Errors
/// Returns the mapped API error.
#[instrument(skip(api, token))]
pub async fn search(
    api: &ApiClient,
    token: &SecretString,
    filters: &UserSearchFilters,
) -> Result<UserSearchResult, ConsoleError> {
    api.get_json_with_query("/admin/users/search", &filters.to_query(), Some(token))
        .await
        .map_err(|failure| failure.or_reason("Failed to search users"))
}

/// # Errors
/// Returns `Validation` for a malformed id, otherwise the mapped API error.
#[instrument(skip(api, token))]
pub async fn user_detail(
    api: &ApiClient,
    token: &SecretString,
    user_id: &str,
) -> Result<AdminUserDetail, ConsoleError> {
    let id = path_id(user_id, "User")?;
    let response: UserDetailResponse = api
        .get_json(&format!("/admin/users/user/{id}"), Some(token))
        .await
        .map_err(|failure| failure.or_reason("Failed to get user details"))?;
    Ok(response.user)
}

/// # Errors
/// Returns `Validation` for a malformed id or an unassignable role.
#[instrument(skip(api, token))]
pub async fn set_role(
    api: &ApiClient,
    token: &SecretString,
    user_id: &str,
    role: &Role,
) -> Result<(), ConsoleError> {
    if *role == Role::Other {
        return Err(ConsoleError::Validation(
            "Role must be either user or admin.".to_string(),
        ));
    }
    let id = path_id(user_id, "User")?;
    let _: Value = api
        .put_json(
            &format!("/admin/users/user/{id}/role"),
            &SetRoleRequest { role },
            Some(token),
        )
        .await
        .map_err(|failure| failure.or_reason("Failed to update user role"))?;
    Ok(())
}

/// # Errors
/// Returns `Validation` for a malformed id, otherwise the mapped API error.
#[instrument(skip(api, token))]
pub async fn delete_user(
    api: &ApiClient,
    token: &SecretString,
    user_id: &str,
) -> Result<(), ConsoleError> {
    let id = path_id(user_id, "User")?;
    api.delete(&format!("/admin/users/user/{id}"), Some(token))
        .await
        .map_err(|failure| failure.or_reason("Failed to delete user"))
}
