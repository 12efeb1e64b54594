//! Client wrappers for the auth endpoints. Centralizes bearer handling and
//! error mapping so login flows stay consistent and tokens never leak into
//! logs.

use crate::{
    app_lib::{ApiClient, ApiFailure, ConsoleError},
    features::auth::types::{
        Identity, IssuedSession, LoginRequest, LoginResponse, RegisterAccountRequest,
        RegisterAccountResponse, VerifyResponse,
    },
};
use secrecy::SecretString;
use tracing::instrument;

/// Validates a persisted token and returns the identity it belongs to.
///
/// # Errors
/// Returns the mapped API error when the token is rejected or unreachable.
#[instrument(skip(api, token))]
pub async fn verify(api: &ApiClient, token: &SecretString) -> Result<Identity, ConsoleError> {
    let response: VerifyResponse = api.get_json("/auth/verify", Some(token)).await?;
    Ok(response.user)
}

/// Password login for regular users.
///
/// # Errors
/// Returns `InvalidCredentials` when the server rejects the email/password.
#[instrument(skip(api, password))]
pub async fn login(
    api: &ApiClient,
    email: &str,
    password: &str,
) -> Result<IssuedSession, ConsoleError> {
    password_login(api, "/auth/user/login", email, password, "Login failed").await
}

/// Password login for administrators.
///
/// # Errors
/// Returns `InvalidCredentials` when the server rejects the email/password.
#[instrument(skip(api, password))]
pub async fn login_admin(
    api: &ApiClient,
    email: &str,
    password: &str,
) -> Result<IssuedSession, ConsoleError> {
    password_login(api, "/auth/admin/login", email, password, "Admin login failed").await
}

/// Creates a new account. Callers validate the form first.
///
/// # Errors
/// Returns `Validation` with the server's reason when registration is refused.
#[instrument(skip(api, request), fields(email = request.email))]
pub async fn register_account(
    api: &ApiClient,
    request: &RegisterAccountRequest<'_>,
) -> Result<RegisterAccountResponse, ConsoleError> {
    api.post_json("/auth/user/register", request, None)
        .await
        .map_err(|failure| match failure {
            ApiFailure::Rejected { body, .. } => ConsoleError::Validation(
                body.reason().unwrap_or("Registration failed").to_string(),
            ),
            ApiFailure::Transport(err) => err,
        })
}

/// Where the operator must be sent to start the Google OAuth redirect flow.
#[must_use]
pub fn google_login_url(api: &ApiClient) -> String {
    api.url("/auth/google")
}

async fn password_login(
    api: &ApiClient,
    path: &str,
    email: &str,
    password: &str,
    fallback: &str,
) -> Result<IssuedSession, ConsoleError> {
    let request = LoginRequest { email, password };
    let response: LoginResponse =
        api.post_json(path, &request, None)
            .await
            .map_err(|failure| match failure {
                ApiFailure::Rejected { status, body, .. } if (400..500).contains(&status) => {
                    ConsoleError::InvalidCredentials(body.reason().unwrap_or(fallback).to_string())
                }
                other => ConsoleError::from(other),
            })?;

    Ok(IssuedSession::from(response))
}
